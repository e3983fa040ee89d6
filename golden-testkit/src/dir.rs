//! Temporary golden/silver directory for tests.

use fs_err as fs;
use golden::{CollectReporter, Settings, SilverWriter};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const GOLDEN_DIR: &str = "golden";
const SILVER_DIR: &str = "silver";

/// A temporary project with `golden/` and `silver/` trees.
///
/// The directory is removed when dropped. A `.git` marker makes it a
/// project root, so `golden.toml` written here is found by
/// [`Settings::find`].
pub struct GoldenDir {
    /// Temporary directory owning everything below.
    _temp: TempDir,
    root: PathBuf,
}

impl GoldenDir {
    pub fn new() -> Result<Self, GoldenDirError> {
        let temp = TempDir::new()?;
        let root = temp.path().to_path_buf();

        fs::create_dir(root.join(".git"))?;
        fs::create_dir_all(root.join(GOLDEN_DIR))?;
        fs::create_dir_all(root.join(SILVER_DIR))?;

        Ok(Self { _temp: temp, root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the golden reference called `name`.
    pub fn golden_path(&self, name: &str) -> PathBuf {
        self.root.join(GOLDEN_DIR).join(name)
    }

    /// Path of the silver output called `name`.
    pub fn silver_path(&self, name: &str) -> PathBuf {
        self.root.join(SILVER_DIR).join(name)
    }

    /// Record a golden reference. Parent directories are created.
    pub fn write_golden(&self, name: &str, contents: &[u8]) -> Result<PathBuf, GoldenDirError> {
        let path = self.golden_path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn read_golden(&self, name: &str) -> Result<Vec<u8>, GoldenDirError> {
        Ok(fs::read(self.golden_path(name))?)
    }

    pub fn read_silver(&self, name: &str) -> Result<Vec<u8>, GoldenDirError> {
        Ok(fs::read(self.silver_path(name))?)
    }

    pub fn has_golden(&self, name: &str) -> bool {
        self.golden_path(name).is_file()
    }

    /// Write `golden.toml` at the root.
    pub fn write_settings(&self, settings: &Settings) -> Result<(), GoldenDirError> {
        settings.save(&self.root)?;
        Ok(())
    }

    /// Settings as a test inside this directory would see them
    /// (ignoring the environment).
    pub fn settings(&self) -> Result<Settings, GoldenDirError> {
        Ok(Settings::find(&self.root).transpose()?.unwrap_or_default())
    }

    /// Open silver output `name` against golden `name`, collecting any
    /// divergence instead of panicking.
    pub fn open(
        &self,
        name: &str,
        settings: &Settings,
    ) -> Result<SilverWriter<CollectReporter>, GoldenDirError> {
        Ok(golden::open_silver_with_reporter(
            self.golden_path(name),
            self.silver_path(name),
            settings,
            CollectReporter::new(),
        )?)
    }

    /// Promote silver `name` to golden `name`.
    pub fn promote(&self, name: &str) -> Result<u64, GoldenDirError> {
        Ok(golden::promote(self.silver_path(name), self.golden_path(name))?)
    }
}

/// Error type for GoldenDir operations.
#[derive(Debug)]
pub enum GoldenDirError {
    /// I/O error.
    Io(std::io::Error),
    /// Error from the golden library.
    Golden(golden::GoldenError),
}

impl std::fmt::Display for GoldenDirError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoldenDirError::Io(e) => write!(f, "I/O error: {}", e),
            GoldenDirError::Golden(e) => write!(f, "golden error: {}", e),
        }
    }
}

impl std::error::Error for GoldenDirError {}

impl From<std::io::Error> for GoldenDirError {
    fn from(e: std::io::Error) -> Self {
        GoldenDirError::Io(e)
    }
}

impl From<golden::GoldenError> for GoldenDirError {
    fn from(e: golden::GoldenError) -> Self {
        GoldenDirError::Golden(e)
    }
}
