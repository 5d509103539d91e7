//! Decides where a bank is loaded from when it is opened.

use crate::config::Config;
use crate::layout::{BackendKind, BankPaths, Backends, LEGACY_BANK_NAME, LEGACY_BANK_PATH};

/// What the backends look like when a bank is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// The bank carries the reserved legacy name.
    pub legacy_name: bool,
    /// The pre-versioned monolithic bank exists.
    pub legacy_file: bool,
    /// The configuration prefers the archive backend.
    pub prefer_archive: bool,
    /// A bank file exists on removable storage.
    pub on_removable: bool,
    /// A bank file exists in the archive.
    pub on_archive: bool,
}

impl Probe {
    /// Inspects the backends for the bank at `paths`.
    #[must_use]
    pub fn run(name: &str, paths: &BankPaths, config: &Config, backends: &Backends) -> Self {
        let removable = backends.get(BackendKind::Removable);
        let legacy_name = name == LEGACY_BANK_NAME;
        Self {
            legacy_name,
            legacy_file: legacy_name && removable.exists(LEGACY_BANK_PATH),
            prefer_archive: config.use_archive,
            on_removable: removable.exists(paths.bank()),
            on_archive: backends.get(BackendKind::Archive).exists(paths.bank()),
        }
    }

    /// The same probe with the legacy file ignored.
    #[must_use]
    pub fn without_legacy(self) -> Self {
        Self {
            legacy_file: false,
            ..self
        }
    }
}

/// How to load a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPlan {
    /// Convert the pre-versioned monolithic bank.
    ConvertLegacy,
    /// Load from this backend, which is also where it will be saved.
    Direct(BackendKind),
    /// Load from `from`, save to `to`, then delete the copy in `from`.
    Move {
        /// Backend currently holding the bank.
        from: BackendKind,
        /// Preferred backend.
        to: BackendKind,
    },
}

/// Picks the load plan for a probe.
#[must_use]
pub fn select(probe: &Probe) -> LoadPlan {
    use BackendKind::{Archive, Removable};

    if probe.legacy_name && probe.legacy_file {
        LoadPlan::ConvertLegacy
    } else if probe.prefer_archive && probe.on_removable {
        LoadPlan::Move {
            from: Removable,
            to: Archive,
        }
    } else if probe.prefer_archive {
        LoadPlan::Direct(Archive)
    } else if probe.on_archive {
        LoadPlan::Move {
            from: Archive,
            to: Removable,
        }
    } else {
        LoadPlan::Direct(Removable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkbank_storage::{InMemoryBackend, StorageBackend};

    fn probe() -> Probe {
        Probe {
            legacy_name: false,
            legacy_file: false,
            prefer_archive: false,
            on_removable: false,
            on_archive: false,
        }
    }

    #[test]
    fn legacy_conversion_wins() {
        let p = Probe {
            legacy_name: true,
            legacy_file: true,
            prefer_archive: true,
            on_removable: true,
            on_archive: true,
        };
        assert_eq!(select(&p), LoadPlan::ConvertLegacy);
        assert_eq!(
            select(&p.without_legacy()),
            LoadPlan::Move {
                from: BackendKind::Removable,
                to: BackendKind::Archive
            }
        );
    }

    #[test]
    fn legacy_file_needs_legacy_name() {
        let p = Probe {
            legacy_file: true,
            ..probe()
        };
        assert_eq!(select(&p), LoadPlan::Direct(BackendKind::Removable));
    }

    #[test]
    fn archive_preferred() {
        let p = Probe {
            prefer_archive: true,
            ..probe()
        };
        assert_eq!(select(&p), LoadPlan::Direct(BackendKind::Archive));

        let p = Probe {
            on_archive: true,
            ..p
        };
        assert_eq!(select(&p), LoadPlan::Direct(BackendKind::Archive));
    }

    #[test]
    fn removable_preferred() {
        assert_eq!(select(&probe()), LoadPlan::Direct(BackendKind::Removable));

        let p = Probe {
            on_removable: true,
            ..probe()
        };
        assert_eq!(select(&p), LoadPlan::Direct(BackendKind::Removable));

        let p = Probe {
            on_archive: true,
            ..probe()
        };
        assert_eq!(
            select(&p),
            LoadPlan::Move {
                from: BackendKind::Archive,
                to: BackendKind::Removable
            }
        );
    }

    #[test]
    fn probe_reads_backends() {
        let mut removable = InMemoryBackend::new();
        removable.write(LEGACY_BANK_PATH, b"old").unwrap();
        removable.write("banks/pksm_1.bnk", b"new").unwrap();
        let backends = Backends::new(removable, InMemoryBackend::new());
        let paths = BankPaths::new(LEGACY_BANK_NAME).unwrap();

        let p = Probe::run(LEGACY_BANK_NAME, &paths, &Config::default(), &backends);
        assert!(p.legacy_name && p.legacy_file && p.on_removable);
        assert!(!p.on_archive);
        assert!(p.prefer_archive);

        let other = BankPaths::new("other").unwrap();
        let p = Probe::run("other", &other, &Config::default(), &backends);
        assert!(!p.legacy_name && !p.legacy_file && !p.on_removable);
    }
}
