//! Error type for golden-file operations.

use std::io;

use crate::compare::Divergence;

/// Errors raised by the comparator, the mode selector and settings loading.
///
/// A divergence is not an error from the comparator's point of view (it is
/// handed to the [`FailureReporter`](crate::FailureReporter));
/// `Diverged` is produced by [`SilverWriter::finish`](crate::SilverWriter::finish).
#[derive(Debug, thiserror::Error)]
pub enum GoldenError {
    /// Reading the golden source or writing the silver sink failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Silver output diverged from the golden reference.
    #[error("{0}")]
    Diverged(Divergence),

    /// Write attempted after `close()`.
    #[error("comparator is closed")]
    Closed,

    /// Invalid settings.
    #[error("config error: {0}")]
    Config(String),

    /// Settings file could not be parsed.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Settings could not be serialized.
    #[error("toml error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl GoldenError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Get the divergence, if this error carries one.
    pub fn divergence(&self) -> Option<&Divergence> {
        match self {
            GoldenError::Diverged(d) => Some(d),
            _ => None,
        }
    }
}

impl From<GoldenError> for io::Error {
    fn from(e: GoldenError) -> Self {
        match e {
            GoldenError::Io(inner) => inner,
            other => io::Error::other(other),
        }
    }
}

pub type Result<T, E = GoldenError> = std::result::Result<T, E>;
