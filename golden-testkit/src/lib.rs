//! Golden Test Kit - utilities for testing golden-file comparison.
//!
//! # Key Types
//!
//! - [`GoldenDir`]: Temporary directory with `golden/` and `silver/` trees
//! - [`Scenario`]: Golden bytes, silver writes, and the expected outcome
//! - [`ScenarioReport`]: Mismatches between expected and actual outcome
//!
//! # Example
//!
//! ```
//! use golden_testkit::{DivergenceKind, Scenario};
//!
//! Scenario::builder("golden shorter")
//!     .golden("abc")
//!     .bytes("abcd")
//!     .expect_divergence(DivergenceKind::GoldenExhausted, 4)
//!     .expect_at_step(0)
//!     .build()
//!     .assert();
//! ```

mod diff;
mod dir;
mod scenario;

pub use diff::{Mismatch, ScenarioReport};
pub use dir::{GoldenDir, GoldenDirError};
pub use scenario::{
    Content, ExpectedDivergence, Expectation, Scenario, ScenarioBuilder, ScenarioOutcome, Step,
};

/// Re-export golden for convenience in tests.
pub use golden;
pub use golden::DivergenceKind;
