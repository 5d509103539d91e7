//! Physical layout of bank files across the two storage backends.
//!
//! ```text
//! <backend root>/
//! ├─ banks/<name>.bnk        # bank image
//! ├─ banks/<name>.json       # box names
//! ├─ banks/<name>.bnk.bak    # backup snapshot (removable storage only)
//! ├─ banks/<name>.json.bak
//! ├─ bank/bank.bin           # pre-versioned monolithic bank (removable storage only)
//! └─ backups/bank.bin        # raw copy of it, kept after conversion
//! ```

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use pkbank_storage::StorageBackend;
use std::fmt;

/// Bank name that inherits the pre-versioned monolithic bank.
pub const LEGACY_BANK_NAME: &str = "pksm_1";

/// Location of the pre-versioned monolithic bank on removable storage.
pub const LEGACY_BANK_PATH: &str = "bank/bank.bin";

/// Where the raw legacy bytes are kept after conversion.
pub const LEGACY_BACKUP_PATH: &str = "backups/bank.bin";

const BANKS_DIR: &str = "banks";

/// Suffix appended to backup snapshots.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Object paths belonging to one bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankPaths {
    bank: String,
    names: String,
}

impl BankPaths {
    /// Paths for the bank called `name`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` for names that are empty or contain path
    /// separators.
    pub fn new(name: &str) -> CoreResult<Self> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(CoreError::invalid_operation(format!(
                "invalid bank name: {name:?}"
            )));
        }
        Ok(Self {
            bank: format!("{BANKS_DIR}/{name}.bnk"),
            names: format!("{BANKS_DIR}/{name}.json"),
        })
    }

    /// The bank image.
    #[must_use]
    pub fn bank(&self) -> &str {
        &self.bank
    }

    /// The box-name sidecar.
    #[must_use]
    pub fn names(&self) -> &str {
        &self.names
    }

    /// Backup of the bank image.
    #[must_use]
    pub fn bank_backup(&self) -> String {
        format!("{}{BACKUP_SUFFIX}", self.bank)
    }

    /// Backup of the box-name sidecar.
    #[must_use]
    pub fn names_backup(&self) -> String {
        format!("{}{BACKUP_SUFFIX}", self.names)
    }
}

/// One of the two physical storage locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Removable storage (SD card).
    Removable,
    /// Archive storage (console save archive).
    Archive,
}

impl BackendKind {
    /// Both backends.
    pub const ALL: [Self; 2] = [Self::Removable, Self::Archive];

    /// The backend `config` asks banks to be saved to.
    #[must_use]
    pub fn preferred(config: &Config) -> Self {
        if config.use_archive {
            Self::Archive
        } else {
            Self::Removable
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Removable => f.write_str("removable"),
            Self::Archive => f.write_str("archive"),
        }
    }
}

/// The pair of storage backends a bank is spread across.
pub struct Backends {
    removable: Box<dyn StorageBackend>,
    archive: Box<dyn StorageBackend>,
}

impl Backends {
    /// Bundles a removable-storage backend and an archive backend.
    pub fn new(
        removable: impl StorageBackend + 'static,
        archive: impl StorageBackend + 'static,
    ) -> Self {
        Self {
            removable: Box::new(removable),
            archive: Box::new(archive),
        }
    }

    /// Returns the backend of the given kind.
    #[must_use]
    pub fn get(&self, kind: BackendKind) -> &dyn StorageBackend {
        match kind {
            BackendKind::Removable => self.removable.as_ref(),
            BackendKind::Archive => self.archive.as_ref(),
        }
    }

    /// Returns the backend of the given kind, mutably.
    pub fn get_mut(&mut self, kind: BackendKind) -> &mut dyn StorageBackend {
        match kind {
            BackendKind::Removable => self.removable.as_mut(),
            BackendKind::Archive => self.archive.as_mut(),
        }
    }
}

impl fmt::Debug for Backends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backends").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkbank_storage::InMemoryBackend;

    #[test]
    fn bank_paths() {
        let paths = BankPaths::new("pksm_1").unwrap();
        assert_eq!(paths.bank(), "banks/pksm_1.bnk");
        assert_eq!(paths.names(), "banks/pksm_1.json");
        assert_eq!(paths.bank_backup(), "banks/pksm_1.bnk.bak");
        assert_eq!(paths.names_backup(), "banks/pksm_1.json.bak");
    }

    #[test]
    fn bad_names_rejected() {
        for name in ["", "a/b", "..", "a\\b"] {
            assert!(BankPaths::new(name).is_err(), "{name:?}");
        }
    }

    #[test]
    fn preferred_backend() {
        assert_eq!(
            BackendKind::preferred(&Config::new().use_archive(true)),
            BackendKind::Archive
        );
        assert_eq!(
            BackendKind::preferred(&Config::new().use_archive(false)),
            BackendKind::Removable
        );
    }

    #[test]
    fn backends_are_distinct() {
        let removable = InMemoryBackend::new();
        let archive = InMemoryBackend::new();
        let mut backends = Backends::new(removable.clone(), archive.clone());

        backends
            .get_mut(BackendKind::Archive)
            .write("x", b"1")
            .unwrap();
        assert!(archive.exists("x"));
        assert!(!removable.exists("x"));
        assert!(backends.get(BackendKind::Archive).exists("x"));
    }
}
