//! Output formatting for the CLI.
//!
//! Handles human-readable and JSON output formats.

use golden::{Divergence, Mode};
use serde::Serialize;

/// Result of a check or compare run.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict<'a> {
    /// Silver matched golden byte for byte.
    Match { bytes: usize },
    /// Silver was written without comparison.
    Recorded,
    /// Silver diverged from golden.
    Diverged { divergence: &'a Divergence },
}

impl<'a> Verdict<'a> {
    pub fn new(mode: Mode, divergence: Option<&'a Divergence>, bytes: usize) -> Self {
        match (mode, divergence) {
            (Mode::Record, _) => Verdict::Recorded,
            (Mode::Compare, Some(divergence)) => Verdict::Diverged { divergence },
            (Mode::Compare, None) => Verdict::Match { bytes },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Verdict::Diverged { .. })
    }
}

/// Output handler for CLI commands.
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn verdict(&self, verdict: &Verdict<'_>) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(verdict)?);
            return Ok(());
        }
        match verdict {
            Verdict::Match { bytes } => println!("Silver matches golden ({} bytes)", bytes),
            Verdict::Recorded => println!("Silver recorded (no comparison)"),
            // The diff already ends with a newline.
            Verdict::Diverged { divergence } => print!("{}", divergence),
        }
        Ok(())
    }

    pub fn promoted(&self, silver: &str, golden: &str, bytes: u64) -> anyhow::Result<()> {
        if self.json {
            let value = serde_json::json!({
                "status": "promoted",
                "silver": silver,
                "golden": golden,
                "bytes": bytes,
            });
            println!("{}", value);
        } else {
            println!("Promoted {} to {} ({} bytes)", silver, golden, bytes);
        }
        Ok(())
    }
}
