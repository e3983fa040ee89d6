//! Line-by-line rendering of golden vs silver context.

use std::fmt;

/// One rendered line of a divergence report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    /// Line present and identical on both sides.
    Same(String),
    /// Golden-side line (mismatched, or golden is longer).
    Golden(String),
    /// Silver-side line (mismatched, or silver is longer).
    Silver(String),
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffLine::Same(line) => write!(f, "= {}", line),
            DiffLine::Golden(line) => write!(f, "< {}", line),
            DiffLine::Silver(line) => write!(f, "> {}", line),
        }
    }
}

/// Pair up golden and silver lines by index.
///
/// No alignment is attempted: an inserted line shifts everything after it
/// into mismatched pairs.
pub fn diff_lines(golden: &[String], silver: &[String]) -> Vec<DiffLine> {
    let common = golden.len().min(silver.len());
    let mut out = Vec::with_capacity(golden.len().max(silver.len()) + common);

    for (g, s) in golden.iter().zip(silver.iter()) {
        if g == s {
            out.push(DiffLine::Same(g.clone()));
        } else {
            out.push(DiffLine::Golden(g.clone()));
            out.push(DiffLine::Silver(s.clone()));
        }
    }

    if silver.len() > golden.len() {
        out.extend(silver[common..].iter().cloned().map(DiffLine::Silver));
    } else {
        out.extend(golden[common..].iter().cloned().map(DiffLine::Golden));
    }
    out
}

/// Render the diff as text, one newline-terminated line per entry.
pub fn render(golden: &[String], silver: &[String]) -> String {
    let mut text = String::new();
    for line in diff_lines(golden, silver) {
        text.push_str(&line.to_string());
        text.push('\n');
    }
    text
}
