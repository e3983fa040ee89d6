//! Fail-fast golden-file comparison.
//!
//! A test writes its output (the *silver* stream) through a
//! [`GoldenComparator`], which checks every byte against the previously
//! recorded *golden* reference as it arrives. The first divergence is
//! reported right away with a few lines of context from both sides:
//!
//! ```text
//! golden mismatch at byte 22 (content mismatch):
//! = header
//! = row 1
//! < row 2: 40
//! > row 2: 41
//! ```
//!
//! # Modules
//!
//! - `compare`: the streaming comparator and divergence types
//! - `context`, `render`: context windows and the diff text format
//! - `report`: failure hooks (panic, collect, closures)
//! - `source`, `mode`: opening golden/silver files, compare vs record, promote
//! - `config`: `golden.toml` settings and the `GOLDEN_MODE` override
//!
//! # Example
//!
//! ```no_run
//! use std::io::Write;
//!
//! let settings = golden::Settings::resolve(".").unwrap();
//! let mut out = golden::open_silver(
//!     "tests/golden/report.txt",
//!     "target/silver/report.txt",
//!     &settings,
//! )
//! .unwrap();
//! writeln!(out, "header").unwrap();
//! out.close().unwrap();
//! ```

pub mod compare;
pub mod config;
pub mod context;
mod error;
pub mod mode;
pub mod render;
pub mod report;
pub mod source;

pub use compare::{CompareOptions, Divergence, DivergenceKind, GoldenComparator};
pub use config::{find_root, Settings, CONFIG_FILE_NAME, MAX_READ_BYTES, MODE_ENV_VAR};
pub use context::ContextLimits;
pub use error::{GoldenError, Result};
pub use mode::{open_silver, open_silver_with_reporter, promote, Mode, SilverWriter};
pub use report::{CollectReporter, FailureReporter, PanicReporter};
pub use source::GoldenSource;
