//! Compare-or-record selection and the silver writer it produces.

use std::fmt;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use fs_err as fs;
use serde::{Deserialize, Serialize};

use crate::compare::{Divergence, GoldenComparator};
use crate::config::Settings;
use crate::error::{GoldenError, Result};
use crate::report::{FailureReporter, PanicReporter};
use crate::source::GoldenSource;

/// What a silver writer does with the bytes it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Check silver against golden as it is written.
    Compare,
    /// Write silver only; the golden file is (re)generated from it later.
    Record,
}

impl Mode {
    pub fn from_fail_fast(fail_fast: bool) -> Self {
        if fail_fast {
            Mode::Compare
        } else {
            Mode::Record
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Compare => write!(f, "compare"),
            Mode::Record => write!(f, "record"),
        }
    }
}

impl FromStr for Mode {
    type Err = GoldenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compare" => Ok(Mode::Compare),
            "record" => Ok(Mode::Record),
            other => Err(GoldenError::config(format!(
                "unknown mode '{}', expected 'compare' or 'record'",
                other
            ))),
        }
    }
}

type SilverFile = BufWriter<fs::File>;

/// Silver output opened for a given [`Mode`].
pub enum SilverWriter<F = PanicReporter> {
    Compare(GoldenComparator<GoldenSource, SilverFile, F>),
    Record(SilverFile),
}

impl<F: FailureReporter> SilverWriter<F> {
    pub fn mode(&self) -> Mode {
        match self {
            SilverWriter::Compare(_) => Mode::Compare,
            SilverWriter::Record(_) => Mode::Record,
        }
    }

    /// Divergence seen so far. Always `None` when recording.
    pub fn divergence(&self) -> Option<&Divergence> {
        match self {
            SilverWriter::Compare(cmp) => cmp.divergence(),
            SilverWriter::Record(_) => None,
        }
    }

    /// Finish the output: run the close-time golden check when comparing,
    /// and flush the silver file.
    pub fn close(&mut self) -> Result<()> {
        match self {
            SilverWriter::Compare(cmp) => cmp.close(),
            SilverWriter::Record(out) => Ok(out.flush()?),
        }
    }

    /// Close the output and turn any divergence into an error.
    ///
    /// Meant for reporters that do not abort, such as
    /// [`CollectReporter`](crate::CollectReporter), when the caller wants a
    /// `Result` instead of inspecting [`divergence`](Self::divergence).
    pub fn finish(mut self) -> Result<()> {
        self.close()?;
        match self.divergence() {
            Some(d) => Err(GoldenError::Diverged(d.clone())),
            None => Ok(()),
        }
    }
}

impl<F: FailureReporter> Write for SilverWriter<F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SilverWriter::Compare(cmp) => cmp.write(buf),
            SilverWriter::Record(out) => out.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SilverWriter::Compare(cmp) => cmp.flush(),
            SilverWriter::Record(out) => out.flush(),
        }
    }
}

/// Open silver output for a test, failing the test by panic on divergence.
pub fn open_silver(
    golden_path: impl AsRef<Path>,
    silver_path: impl AsRef<Path>,
    settings: &Settings,
) -> Result<SilverWriter> {
    open_silver_with_reporter(golden_path, silver_path, settings, PanicReporter)
}

/// Open silver output, sending any divergence to `reporter`.
///
/// The silver file is created (parent directories included) in both modes.
/// The golden file is only opened when comparing; a missing golden file
/// compares as empty.
pub fn open_silver_with_reporter<F: FailureReporter>(
    golden_path: impl AsRef<Path>,
    silver_path: impl AsRef<Path>,
    settings: &Settings,
    reporter: F,
) -> Result<SilverWriter<F>> {
    let silver_path = silver_path.as_ref();
    if let Some(parent) = silver_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let silver = BufWriter::new(fs::File::create(silver_path)?);

    let mode = settings.mode();
    log::debug!("Opening silver {} in {} mode", silver_path.display(), mode);
    match mode {
        Mode::Compare => {
            let golden = GoldenSource::open(golden_path)?;
            let cmp = GoldenComparator::with_reporter(golden, silver, reporter)
                .with_options(settings.compare_options());
            Ok(SilverWriter::Compare(cmp))
        }
        Mode::Record => Ok(SilverWriter::Record(silver)),
    }
}

/// Make the recorded silver file the new golden reference.
pub fn promote(silver_path: impl AsRef<Path>, golden_path: impl AsRef<Path>) -> Result<u64> {
    let silver_path = silver_path.as_ref();
    let golden_path = golden_path.as_ref();
    if let Some(parent) = golden_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let bytes = fs::copy(silver_path, golden_path)?;
    log::info!(
        "Promoted {} to {} ({} bytes)",
        silver_path.display(),
        golden_path.display(),
        bytes
    );
    Ok(bytes)
}
