//! Trailing context windows around a divergence point.

use std::ops::Range;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_BACK_LINES: usize = 5;
pub const DEFAULT_MAX_BACK_BYTES: usize = 500;

/// How far back from the divergence point a context window may reach.
///
/// Both limits apply; whichever is more restrictive wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextLimits {
    /// Newline boundaries crossed when walking back from the anchor.
    pub max_back_lines: usize,
    /// Bytes between the window start and the anchor.
    pub max_back_bytes: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            max_back_lines: DEFAULT_MAX_BACK_LINES,
            max_back_bytes: DEFAULT_MAX_BACK_BYTES,
        }
    }
}

/// Byte range of `buf` to show as context for a divergence at `anchor`.
///
/// `anchor` is the 0-based index of the first divergent byte and may sit at
/// or past the end of `buf` (one side ran out). The range always extends to
/// the end of `buf`, so bytes read after the divergence are included.
pub fn context_range(buf: &[u8], anchor: usize, limits: ContextLimits) -> Range<usize> {
    if buf.is_empty() {
        return 0..0;
    }
    let anchor = anchor.min(buf.len());

    let mut start = anchor;
    let mut cursor = anchor;
    for _ in 0..limits.max_back_lines {
        match buf[..cursor].iter().rposition(|&b| b == b'\n') {
            Some(nl) => {
                start = nl + 1;
                cursor = nl;
            }
            None => {
                start = 0;
                break;
            }
        }
    }

    // Dense content with few newlines: cap by bytes.
    if anchor - start > limits.max_back_bytes {
        start = anchor - limits.max_back_bytes;
    }

    start..buf.len()
}

/// Context window split into lines for rendering.
///
/// Bytes are decoded as UTF-8; invalid sequences (including a code point cut
/// by the byte limit) are replaced rather than rejected. Empty lines at the
/// end of the window are dropped.
pub fn context_lines(buf: &[u8], anchor: usize, limits: ContextLimits) -> Vec<String> {
    let range = context_range(buf, anchor, limits);
    let text = String::from_utf8_lossy(&buf[range]);
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(max_back_lines: usize, max_back_bytes: usize) -> ContextLimits {
        ContextLimits {
            max_back_lines,
            max_back_bytes,
        }
    }

    #[test]
    fn empty_buffer_has_no_context() {
        assert_eq!(context_range(b"", 10, ContextLimits::default()), 0..0);
        assert!(context_lines(b"", 0, ContextLimits::default()).is_empty());
    }

    #[test]
    fn single_line_starts_at_buffer_start() {
        let lines = context_lines(b"abcXdef", 3, ContextLimits::default());
        assert_eq!(lines, vec!["abcXdef"]);
    }

    #[test]
    fn walks_back_at_most_max_lines() {
        let buf = b"l1\nl2\nl3\nl4\nl5\nl6\nl7\nbad\n";
        let anchor = buf.len() - 4; // start of "bad"
        let lines = context_lines(buf, anchor, limits(3, 500));
        assert_eq!(lines, vec!["l6", "l7", "bad"]);
    }

    #[test]
    fn fewer_lines_than_limit_reaches_start() {
        let buf = b"one\ntwo\nthree";
        let lines = context_lines(buf, 9, ContextLimits::default());
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[test]
    fn byte_limit_clamps_dense_content() {
        let buf = vec![b'x'; 2000];
        let range = context_range(&buf, 1500, limits(5, 500));
        assert_eq!(range, 1000..2000);
    }

    #[test]
    fn anchor_past_end_is_clamped() {
        let range = context_range(b"ab\ncd", 99, ContextLimits::default());
        assert_eq!(range, 0..5);
    }

    #[test]
    fn includes_bytes_after_anchor() {
        let buf = b"a\nb\nc\nd\ne\n";
        let lines = context_lines(buf, 2, limits(1, 500));
        assert_eq!(lines, vec!["b", "c", "d", "e"]);
    }

    #[test]
    fn zero_lines_starts_at_anchor() {
        let range = context_range(b"a\nbcd", 3, limits(0, 500));
        assert_eq!(range, 3..5);
    }

    #[test]
    fn split_code_point_is_replaced() {
        let buf = "é".repeat(10);
        // 18 - 5 = 13 lands on the second byte of a two-byte "é".
        let lines = context_lines(buf.as_bytes(), 18, limits(5, 5));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with('\u{FFFD}'));
    }
}
