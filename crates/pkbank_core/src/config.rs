//! Bank configuration.

use crate::error::CoreResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings the bank engine consults during load, save and conversion.
///
/// A `Config` is owned by the [`Bank`](crate::Bank) it was opened with. It
/// may be tied to a JSON file via [`Config::load`], in which case
/// [`Config::persist`] writes changes (such as the box count discovered by
/// legacy conversion) back to that file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whether the archive backend is preferred over removable storage.
    pub use_archive: bool,

    /// Number of boxes used when a bank is created from scratch.
    pub box_count: u32,

    /// Whether a backup snapshot is written every time a bank is loaded.
    pub auto_backup: bool,

    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_archive: true,
            box_count: 1,
            auto_backup: true,
            path: None,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration file, falling back to defaults if it is missing.
    ///
    /// The returned config remembers `path` for later [`persist`](Self::persist) calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let mut config = if path.exists() {
            let text = fs::read_to_string(path)?;
            serde_json::from_str::<Self>(&text)?
        } else {
            Self::default()
        };
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Writes the configuration back to the file it was loaded from.
    ///
    /// Does nothing for configurations that were never tied to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn persist(&self) -> CoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Returns the backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Sets the backend preference.
    #[must_use]
    pub const fn use_archive(mut self, value: bool) -> Self {
        self.use_archive = value;
        self
    }

    /// Sets the box count for newly created banks.
    #[must_use]
    pub const fn box_count(mut self, boxes: u32) -> Self {
        self.box_count = boxes;
        self
    }

    /// Sets whether banks are backed up on load.
    #[must_use]
    pub const fn auto_backup(mut self, value: bool) -> Self {
        self.auto_backup = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.use_archive);
        assert!(config.auto_backup);
        assert_eq!(config.box_count, 1);
        assert!(config.path().is_none());
    }

    #[test]
    fn builder_pattern() {
        let config = Config::new()
            .use_archive(false)
            .auto_backup(false)
            .box_count(6);

        assert!(!config.use_archive);
        assert!(!config.auto_backup);
        assert_eq!(config.box_count, 6);
    }

    #[test]
    fn persist_without_path_is_noop() {
        assert!(Config::default().persist().is_ok());
    }

    #[test]
    fn load_missing_then_persist_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config").join("pkbank.json");

        let mut config = Config::load(&path).unwrap();
        assert_eq!(config.box_count, 1);
        config.box_count = 12;
        config.use_archive = false;
        config.persist().unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.box_count, 12);
        assert!(!reloaded.use_archive);
        assert_eq!(reloaded.path(), Some(path.as_path()));
    }

    #[test]
    fn load_fills_missing_fields_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pkbank.json");
        fs::write(&path, r#"{ "box_count": 40 }"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.box_count, 40);
        assert!(config.use_archive);
    }

    #[test]
    fn load_rejects_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pkbank.json");
        fs::write(&path, "not json").unwrap();

        assert!(Config::load(&path).is_err());
    }
}
