//! Failure reporting hooks.
//!
//! The comparator does not know which test framework it runs under. It hands
//! each divergence to a [`FailureReporter`] exactly once and leaves the rest
//! to the reporter: panic (the usual way to fail a Rust test), collect for
//! later inspection, or anything a closure can do.

use crate::compare::Divergence;

/// Receives the first divergence detected by a comparator.
pub trait FailureReporter {
    /// Called once with the divergence. May panic to abort the test.
    fn report(&mut self, divergence: &Divergence);
}

/// Fails the current test by panicking with the rendered diff.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicReporter;

impl FailureReporter for PanicReporter {
    fn report(&mut self, divergence: &Divergence) {
        panic!("{}", divergence);
    }
}

/// Keeps every reported divergence.
#[derive(Debug, Clone, Default)]
pub struct CollectReporter {
    reported: Vec<Divergence>,
}

impl CollectReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All divergences reported so far, oldest first.
    pub fn reported(&self) -> &[Divergence] {
        &self.reported
    }

    /// The first reported divergence, if any.
    pub fn first(&self) -> Option<&Divergence> {
        self.reported.first()
    }

    pub fn is_empty(&self) -> bool {
        self.reported.is_empty()
    }
}

impl FailureReporter for CollectReporter {
    fn report(&mut self, divergence: &Divergence) {
        log::debug!("Collected divergence at byte {}", divergence.offset);
        self.reported.push(divergence.clone());
    }
}

impl<F> FailureReporter for F
where
    F: FnMut(&Divergence),
{
    fn report(&mut self, divergence: &Divergence) {
        self(divergence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::DivergenceKind;

    fn sample() -> Divergence {
        Divergence {
            kind: DivergenceKind::Mismatch,
            offset: 4,
            diff: "< abcXdef\n> abcYdef\n".to_string(),
        }
    }

    #[test]
    #[should_panic(expected = "< abcXdef")]
    fn panic_reporter_panics_with_diff() {
        PanicReporter.report(&sample());
    }

    #[test]
    fn collect_reporter_keeps_divergences() {
        let mut reporter = CollectReporter::new();
        assert!(reporter.is_empty());
        reporter.report(&sample());
        assert_eq!(reporter.reported().len(), 1);
        assert_eq!(reporter.first().map(|d| d.offset), Some(4));
    }

    #[test]
    fn closures_are_reporters() {
        let mut offsets = Vec::new();
        {
            let mut reporter = |d: &Divergence| offsets.push(d.offset);
            reporter.report(&sample());
        }
        assert_eq!(offsets, vec![4]);
    }
}
