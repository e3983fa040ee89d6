//! Scenario outcome diffing utilities.

use golden::DivergenceKind;

use crate::scenario::{Expectation, ScenarioOutcome};

/// Difference between a scenario's expectation and its outcome.
#[derive(Debug, Clone, Default)]
pub struct ScenarioReport {
    /// List of mismatches found.
    pub mismatches: Vec<Mismatch>,
}

/// A mismatch between expected and actual behavior.
#[derive(Debug, Clone)]
pub enum Mismatch {
    /// Silver diverged but a match was expected.
    UnexpectedDivergence { kind: DivergenceKind, offset: usize },

    /// A divergence was expected but none was reported.
    MissingDivergence { kind: DivergenceKind },

    /// Divergence kind differs.
    KindMismatch {
        expected: DivergenceKind,
        actual: DivergenceKind,
    },

    /// Divergence offset differs.
    OffsetMismatch { expected: usize, actual: usize },

    /// Rendered diff differs.
    DiffMismatch { expected: String, actual: String },

    /// Rendered diff lacks a required line.
    MissingDiffLine { line: String },

    /// Divergence reported during a different step.
    StepMismatch {
        expected: Option<usize>,
        actual: Option<usize>,
    },

    /// Reporter called more than once.
    ReportedTwice { count: usize },

    /// Silver sink contents differ.
    SilverMismatch { expected: Vec<u8>, actual: Vec<u8> },
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mismatch::UnexpectedDivergence { kind, offset } => {
                write!(f, "Unexpected divergence at byte {} ({})", offset, kind)
            }
            Mismatch::MissingDivergence { kind } => {
                write!(f, "Expected divergence ({}) but silver matched", kind)
            }
            Mismatch::KindMismatch { expected, actual } => {
                write!(f, "Divergence kind: expected {}, got {}", expected, actual)
            }
            Mismatch::OffsetMismatch { expected, actual } => {
                write!(f, "Divergence offset: expected {}, got {}", expected, actual)
            }
            Mismatch::DiffMismatch { expected, actual } => {
                write!(f, "Diff text: expected {:?}, got {:?}", expected, actual)
            }
            Mismatch::MissingDiffLine { line } => {
                write!(f, "Diff text lacks line {:?}", line)
            }
            Mismatch::StepMismatch { expected, actual } => {
                write!(f, "Diverging step: expected {:?}, got {:?}", expected, actual)
            }
            Mismatch::ReportedTwice { count } => {
                write!(f, "Reporter called {} times", count)
            }
            Mismatch::SilverMismatch { expected, actual } => {
                write!(
                    f,
                    "Silver output: expected {:?}, got {:?}",
                    String::from_utf8_lossy(expected),
                    String::from_utf8_lossy(actual)
                )
            }
        }
    }
}

impl ScenarioReport {
    /// Compare an outcome against its expectation.
    pub fn compare(expected: &Expectation, actual: &ScenarioOutcome) -> Self {
        let mut mismatches = Vec::new();

        match (&expected.divergence, &actual.divergence) {
            (None, Some(d)) => mismatches.push(Mismatch::UnexpectedDivergence {
                kind: d.kind,
                offset: d.offset,
            }),
            (Some(exp), None) => mismatches.push(Mismatch::MissingDivergence { kind: exp.kind }),
            (Some(exp), Some(act)) => {
                if exp.kind != act.kind {
                    mismatches.push(Mismatch::KindMismatch {
                        expected: exp.kind,
                        actual: act.kind,
                    });
                }
                if let Some(offset) = exp.offset {
                    if offset != act.offset {
                        mismatches.push(Mismatch::OffsetMismatch {
                            expected: offset,
                            actual: act.offset,
                        });
                    }
                }
                if let Some(diff) = &exp.diff {
                    if diff != &act.diff {
                        mismatches.push(Mismatch::DiffMismatch {
                            expected: diff.clone(),
                            actual: act.diff.clone(),
                        });
                    }
                }
                for line in &exp.diff_contains {
                    if !act.diff.lines().any(|l| l == line) {
                        mismatches.push(Mismatch::MissingDiffLine { line: line.clone() });
                    }
                }
            }
            (None, None) => {}
        }

        if expected.at_step.is_some() && expected.at_step != actual.at_step {
            mismatches.push(Mismatch::StepMismatch {
                expected: expected.at_step,
                actual: actual.at_step,
            });
        }

        // Failure is terminal: never more than one report.
        if actual.report_count > 1 {
            mismatches.push(Mismatch::ReportedTwice {
                count: actual.report_count,
            });
        }

        if let Some(silver) = &expected.silver {
            if silver.as_bytes() != actual.silver.as_slice() {
                mismatches.push(Mismatch::SilverMismatch {
                    expected: silver.as_bytes().to_vec(),
                    actual: actual.silver.clone(),
                });
            }
        }

        Self { mismatches }
    }

    /// Check if there are no mismatches.
    pub fn is_empty(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Get the number of mismatches.
    pub fn len(&self) -> usize {
        self.mismatches.len()
    }

    /// Format the report as human-readable text.
    pub fn report(&self) -> String {
        if self.is_empty() {
            return "No differences found.".to_string();
        }

        let mut lines = vec![format!("Found {} differences:", self.mismatches.len())];
        for m in &self.mismatches {
            lines.push(format!("  - {}", m));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ExpectedDivergence;
    use golden::Divergence;

    fn outcome(divergence: Option<Divergence>) -> ScenarioOutcome {
        ScenarioOutcome {
            report_count: usize::from(divergence.is_some()),
            at_step: divergence.as_ref().map(|_| 0),
            divergence,
            position: 0,
            silver: b"abc".to_vec(),
        }
    }

    fn mismatch_at(offset: usize) -> Divergence {
        Divergence {
            kind: DivergenceKind::Mismatch,
            offset,
            diff: "< abX\n> abc\n".to_string(),
        }
    }

    #[test]
    fn test_matching_expectation() {
        let report = ScenarioReport::compare(&Expectation::default(), &outcome(None));
        assert!(report.is_empty());
        assert_eq!(report.report(), "No differences found.");
    }

    #[test]
    fn test_unexpected_divergence() {
        let report = ScenarioReport::compare(&Expectation::default(), &outcome(Some(mismatch_at(3))));
        assert_eq!(report.len(), 1);
        assert!(matches!(
            report.mismatches[0],
            Mismatch::UnexpectedDivergence { offset: 3, .. }
        ));
    }

    #[test]
    fn test_offset_and_line_mismatch() {
        let expected = Expectation {
            divergence: Some(ExpectedDivergence {
                kind: DivergenceKind::Mismatch,
                offset: Some(2),
                diff: None,
                diff_contains: vec!["> abd".to_string(), "> abc".to_string()],
            }),
            ..Expectation::default()
        };
        let report = ScenarioReport::compare(&expected, &outcome(Some(mismatch_at(3))));
        assert_eq!(report.len(), 2);
        assert!(matches!(
            report.mismatches[0],
            Mismatch::OffsetMismatch {
                expected: 2,
                actual: 3
            }
        ));
        assert!(matches!(&report.mismatches[1], Mismatch::MissingDiffLine { line } if line == "> abd"));
        assert!(report.report().starts_with("Found 2 differences:"));
    }

    #[test]
    fn test_silver_mismatch() {
        let expected = Expectation {
            silver: Some("abd".into()),
            ..Expectation::default()
        };
        let report = ScenarioReport::compare(&expected, &outcome(None));
        assert_eq!(report.len(), 1);
        assert!(matches!(report.mismatches[0], Mismatch::SilverMismatch { .. }));
    }
}
