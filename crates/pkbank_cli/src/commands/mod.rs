//! CLI command implementations.

pub mod backup;
pub mod convert;
pub mod inspect;
pub mod rename;
pub mod resize;
pub mod verify;

use crate::species::SpeciesFile;
use pkbank_core::{Backends, Bank, Config, Hooks, SpeciesData, TracingNotifier};
use pkbank_storage::FileBackend;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the CLI finds storage, configuration and species data.
#[derive(Debug, Clone)]
pub struct Context {
    root: PathBuf,
    archive_root: PathBuf,
    config_path: PathBuf,
    species_path: Option<PathBuf>,
}

impl Context {
    /// Resolves defaults for the archive root and config file.
    pub fn new(root: PathBuf, archive_root: Option<PathBuf>, config: Option<PathBuf>) -> Self {
        let archive_root = archive_root.unwrap_or_else(|| root.join("archive"));
        let config_path = config.unwrap_or_else(|| root.join("config.json"));
        Self {
            root,
            archive_root,
            config_path,
            species_path: None,
        }
    }

    /// Uses the species table at `path` for legacy conversion.
    #[must_use]
    pub fn with_species(mut self, path: Option<PathBuf>) -> Self {
        self.species_path = path;
        self
    }

    /// Loads the species table, if one was given.
    pub fn species(&self) -> Result<Option<Arc<dyn SpeciesData>>, Box<dyn std::error::Error>> {
        match &self.species_path {
            Some(path) => Ok(Some(Arc::new(SpeciesFile::load(path)?))),
            None => Ok(None),
        }
    }

    /// Builds file backends for both storage roots.
    pub fn backends(&self) -> Backends {
        Backends::new(
            FileBackend::new(&self.root),
            FileBackend::new(&self.archive_root),
        )
    }

    /// Loads the configuration file, or defaults if it does not exist.
    pub fn config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        Ok(Config::load(&self.config_path)?)
    }

    /// Opens a bank. Notices are forwarded to the log.
    ///
    /// `auto_backup` overrides the configured backup-on-load behaviour
    /// without touching the configuration file.
    pub fn open(&self, name: &str, auto_backup: bool) -> Result<Bank, Box<dyn std::error::Error>> {
        let mut hooks = Hooks::default().notifier(Arc::new(TracingNotifier));
        if let Some(species) = self.species()? {
            hooks = hooks.species(species);
        }
        Ok(Bank::open_with_backup(
            name,
            self.config()?,
            self.backends(),
            hooks,
            Some(auto_backup),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkbank_core::layout::{LEGACY_BANK_NAME, LEGACY_BANK_PATH};
    use pkbank_core::{Generation, GrowthRate};
    use pkbank_storage::StorageBackend;
    use pkbank_testkit::fixtures::LegacyBankBuilder;
    use tempfile::tempdir;

    #[test]
    fn defaults_hang_off_the_root() {
        let ctx = Context::new(PathBuf::from("/sd"), None, None);
        assert_eq!(ctx.archive_root, PathBuf::from("/sd/archive"));
        assert_eq!(ctx.config_path, PathBuf::from("/sd/config.json"));
    }

    #[test]
    fn open_creates_bank_in_archive() {
        let dir = tempdir().unwrap();
        let ctx = Context::new(dir.path().to_path_buf(), None, None);

        let bank = ctx.open("main", false).unwrap();
        assert_eq!(bank.boxes(), 1);
        assert!(dir.path().join("archive/banks/main.bnk").exists());
        assert!(!dir.path().join("banks/main.bnk.bak").exists());
    }

    #[test]
    fn species_table_enables_hyper_training_rule() {
        let dir = tempdir().unwrap();
        let species = dir.path().join("species.json");
        std::fs::write(&species, r#"{ "150": "slow" }"#).unwrap();
        let level_100 = GrowthRate::Slow.experience_for(100);
        let legacy = LegacyBankBuilder::new(1)
            .record(0, |r| {
                r.plausible().encounter_type(30).experience(level_100);
            })
            .build();
        FileBackend::new(dir.path())
            .write(LEGACY_BANK_PATH, &legacy)
            .unwrap();

        let ctx = Context::new(dir.path().to_path_buf(), None, None).with_species(Some(species));
        let bank = ctx.open(LEGACY_BANK_NAME, false).unwrap();
        assert_eq!(bank.entity(0, 0).unwrap().generation(), Generation::Seven);
    }

    #[test]
    fn missing_species_table_is_an_error() {
        let dir = tempdir().unwrap();
        let ctx = Context::new(dir.path().to_path_buf(), None, None)
            .with_species(Some(dir.path().join("missing.json")));
        assert!(ctx.open("main", false).is_err());
    }

    #[test]
    fn resize_persists_box_count() {
        let dir = tempdir().unwrap();
        let ctx = Context::new(dir.path().to_path_buf(), None, None);

        resize::run(&ctx, "main", 3).unwrap();
        assert_eq!(ctx.config().unwrap().box_count, 3);
        assert_eq!(ctx.open("main", false).unwrap().boxes(), 3);
    }
}
