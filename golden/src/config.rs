use std::path::{Path, PathBuf};

use fs_err as fs;
use serde::{Deserialize, Serialize};

use crate::compare::{CompareOptions, DEFAULT_CLOSE_PROBE_BYTES, DEFAULT_LOOKAHEAD_BYTES};
use crate::context::ContextLimits;
use crate::error::{GoldenError, Result};
use crate::mode::Mode;

pub const CONFIG_FILE_NAME: &str = "golden.toml";

/// Upper bound for `lookahead_bytes` and `close_probe_bytes`.
pub const MAX_READ_BYTES: usize = 1 << 20;

/// Overrides `fail_fast` when set: `compare` or `record`.
pub const MODE_ENV_VAR: &str = "GOLDEN_MODE";

/// Project settings, stored in `golden.toml`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Compare silver against golden while it is written. When false, silver
    /// is only recorded so it can be promoted to golden.
    pub fail_fast: bool,
    /// Golden bytes read past a mismatch to show what was expected next.
    pub lookahead_bytes: usize,
    /// Golden bytes read at close to show what silver left out.
    pub close_probe_bytes: usize,
    pub context: ContextLimits,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fail_fast: true,
            lookahead_bytes: DEFAULT_LOOKAHEAD_BYTES,
            close_probe_bytes: DEFAULT_CLOSE_PROBE_BYTES,
            context: ContextLimits::default(),
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, directory: impl AsRef<Path>) -> Result<()> {
        let config_path = directory.as_ref().join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(&self)?;
        fs::write(&config_path, content)?;
        log::info!("Settings saved to {}", config_path.display());
        Ok(())
    }

    /// Look for `golden.toml` at the project root above `current_directory`.
    ///
    /// Returns `None` when there is no project root or it has no settings
    /// file.
    pub fn find(current_directory: impl AsRef<Path>) -> Option<Result<Self>> {
        let root = find_root(current_directory)?;
        let config_path = root.join(CONFIG_FILE_NAME);
        log::debug!("Looking for settings at {}", config_path.display());
        if config_path.is_file() {
            Some(Self::load(&config_path))
        } else {
            log::debug!("No settings file found at {}", config_path.display());
            None
        }
    }

    /// Settings for `current_directory`: the project file if any, else
    /// defaults, with the environment override applied.
    pub fn resolve(current_directory: impl AsRef<Path>) -> Result<Self> {
        let settings = Self::find(current_directory).transpose()?.unwrap_or_default();
        settings.apply_env()
    }

    /// Apply `GOLDEN_MODE` from the environment.
    pub fn apply_env(self) -> Result<Self> {
        let value = std::env::var(MODE_ENV_VAR).ok();
        self.apply_mode_override(value.as_deref())
    }

    pub fn apply_mode_override(mut self, value: Option<&str>) -> Result<Self> {
        if let Some(value) = value {
            let mode: Mode = value.parse()?;
            log::debug!("{} overrides mode to {}", MODE_ENV_VAR, mode);
            self.fail_fast = mode == Mode::Compare;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.context.max_back_lines == 0 {
            return Err(GoldenError::config("context.max_back_lines must be at least 1"));
        }
        if self.context.max_back_bytes == 0 {
            return Err(GoldenError::config("context.max_back_bytes must be at least 1"));
        }
        if self.close_probe_bytes == 0 {
            return Err(GoldenError::config("close_probe_bytes must be at least 1"));
        }
        if self.close_probe_bytes > MAX_READ_BYTES {
            return Err(GoldenError::config(format!(
                "close_probe_bytes must be at most {}",
                MAX_READ_BYTES
            )));
        }
        if self.lookahead_bytes > MAX_READ_BYTES {
            return Err(GoldenError::config(format!(
                "lookahead_bytes must be at most {}",
                MAX_READ_BYTES
            )));
        }
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        Mode::from_fail_fast(self.fail_fast)
    }

    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions {
            context: self.context,
            lookahead_bytes: self.lookahead_bytes,
            close_probe_bytes: self.close_probe_bytes,
        }
    }
}

/// Walk up from `start_dir` until a directory holding `golden.toml` or
/// `.git` is found.
pub fn find_root(start_dir: impl AsRef<Path>) -> Option<PathBuf> {
    let mut dir = start_dir.as_ref();
    log::debug!("Searching for project root starting from {}", dir.display());

    loop {
        if dir.join(CONFIG_FILE_NAME).exists() || dir.join(".git").exists() {
            log::debug!("Found project root at {}", dir.display());
            return Some(dir.to_path_buf());
        }

        dir = dir.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_project() -> (tempfile::TempDir, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        fs::create_dir(root.join(".git")).unwrap();
        (tmp, root)
    }

    #[test]
    fn defaults_match_comparator_defaults() {
        let settings = Settings::default();
        assert!(settings.fail_fast);
        assert_eq!(settings.compare_options(), CompareOptions::default());
        assert_eq!(settings.mode(), Mode::Compare);
    }

    #[test]
    fn save_and_find_roundtrip() {
        let (_tmp, root) = temp_project();
        let mut original = Settings::default();
        original.context.max_back_lines = 3;
        original.fail_fast = false;
        original.save(&root).unwrap();

        let nested = root.join("tests").join("fixtures");
        fs::create_dir_all(&nested).unwrap();
        // Nested dirs have no marker, so the walk reaches the project root.
        let loaded = Settings::find(&nested).unwrap().unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn find_returns_none_without_settings_file() {
        let (_tmp, root) = temp_project();
        assert!(Settings::find(&root).is_none());
    }

    #[test]
    fn partial_file_uses_defaults() {
        let (_tmp, root) = temp_project();
        fs::write(root.join(CONFIG_FILE_NAME), "fail_fast = false\n").unwrap();

        let loaded = Settings::find(&root).unwrap().unwrap();
        assert!(!loaded.fail_fast);
        assert_eq!(loaded.context, ContextLimits::default());
        assert_eq!(loaded.lookahead_bytes, DEFAULT_LOOKAHEAD_BYTES);
    }

    #[test]
    fn invalid_limits_are_rejected() {
        let (_tmp, root) = temp_project();
        fs::write(
            root.join(CONFIG_FILE_NAME),
            "[context]\nmax_back_lines = 0\n",
        )
        .unwrap();

        let result = Settings::find(&root).unwrap();
        assert!(result.unwrap_err().to_string().contains("max_back_lines"));
    }

    #[test]
    fn oversized_read_limits_are_rejected() {
        let settings: Settings =
            toml::from_str("lookahead_bytes = 9223372036854775807\n").unwrap();
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, GoldenError::Config(_)));
        assert!(err.to_string().contains("lookahead_bytes"));

        let settings: Settings = toml::from_str("close_probe_bytes = 1048577\n").unwrap();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("close_probe_bytes"));

        let settings = Settings {
            lookahead_bytes: MAX_READ_BYTES,
            close_probe_bytes: MAX_READ_BYTES,
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn malformed_file_is_a_toml_error() {
        let (_tmp, root) = temp_project();
        fs::write(root.join(CONFIG_FILE_NAME), "fail_fast = ").unwrap();

        let result = Settings::find(&root).unwrap();
        assert!(matches!(result, Err(GoldenError::Toml(_))));
    }

    #[test]
    fn mode_override() {
        let settings = Settings::default()
            .apply_mode_override(Some("record"))
            .unwrap();
        assert!(!settings.fail_fast);

        let settings = settings.apply_mode_override(Some("compare")).unwrap();
        assert!(settings.fail_fast);

        let settings = settings.apply_mode_override(None).unwrap();
        assert!(settings.fail_fast);

        assert!(Settings::default()
            .apply_mode_override(Some("sometimes"))
            .is_err());
    }
}
