//! Backup snapshots of a bank.
//!
//! A snapshot is a plain copy of the bank image and box-name sidecar, written
//! next to the originals with a `.bak` suffix on removable storage. Each
//! backup overwrites the previous one.

use crate::error::CoreResult;
use crate::format::BankImage;
use crate::layout::BankPaths;
use crate::names::BoxNames;
use pkbank_storage::StorageBackend;
use tracing::{debug, warn};

/// A bank read back from its backup files.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// The backed-up image.
    pub image: BankImage,
    /// The backed-up box names, extended to cover every box.
    pub names: BoxNames,
}

/// Writes `image` and `names` as the backup of the bank at `paths`.
///
/// # Errors
///
/// Returns an error if either file cannot be written.
pub fn write_backup(
    backend: &mut dyn StorageBackend,
    paths: &BankPaths,
    image: &BankImage,
    names: &BoxNames,
) -> CoreResult<()> {
    backend.write(&paths.bank_backup(), image.as_bytes())?;
    backend.write(&paths.names_backup(), &names.to_json()?)?;
    debug!(path = %paths.bank_backup(), bytes = image.as_bytes().len(), "bank backed up");
    Ok(())
}

/// Returns true if a backup image exists for the bank at `paths`.
#[must_use]
pub fn has_backup(backend: &dyn StorageBackend, paths: &BankPaths) -> bool {
    backend.exists(&paths.bank_backup())
}

/// Reads the backup of the bank at `paths`.
///
/// A missing or unreadable name sidecar is replaced by default names.
///
/// # Errors
///
/// Returns an error if the backup image is missing or not a valid bank.
pub fn read_backup(backend: &dyn StorageBackend, paths: &BankPaths) -> CoreResult<Snapshot> {
    let image = BankImage::parse(backend.read(&paths.bank_backup())?)?.image;
    let mut names = match backend
        .read(&paths.names_backup())
        .map_err(Into::into)
        .and_then(|data| BoxNames::from_json(&data))
    {
        Ok(names) => names,
        Err(e) => {
            warn!(error = %e, "backup box names unusable, using defaults");
            BoxNames::default()
        }
    };
    names.extend_to(image.boxes());
    Ok(Snapshot { image, names })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use pkbank_storage::InMemoryBackend;

    #[test]
    fn write_then_read() {
        let mut backend = InMemoryBackend::new();
        let paths = BankPaths::new("main").unwrap();
        let image = BankImage::create(2);
        let mut names = BoxNames::with_defaults(2);
        names.set(1, "Legends");

        assert!(!has_backup(&backend, &paths));
        write_backup(&mut backend, &paths, &image, &names).unwrap();
        assert!(has_backup(&backend, &paths));
        assert!(backend.exists("banks/main.json.bak"));

        let snapshot = read_backup(&backend, &paths).unwrap();
        assert_eq!(snapshot.image, image);
        assert_eq!(snapshot.names, names);
    }

    #[test]
    fn overwrites_previous_backup() {
        let mut backend = InMemoryBackend::new();
        let paths = BankPaths::new("main").unwrap();

        write_backup(&mut backend, &paths, &BankImage::create(1), &BoxNames::with_defaults(1)).unwrap();
        write_backup(&mut backend, &paths, &BankImage::create(3), &BoxNames::with_defaults(3)).unwrap();

        assert_eq!(read_backup(&backend, &paths).unwrap().image.boxes(), 3);
    }

    #[test]
    fn missing_names_fall_back_to_defaults() {
        let mut backend = InMemoryBackend::new();
        let paths = BankPaths::new("main").unwrap();
        backend
            .write(&paths.bank_backup(), BankImage::create(2).as_bytes())
            .unwrap();

        let snapshot = read_backup(&backend, &paths).unwrap();
        assert_eq!(snapshot.names, BoxNames::with_defaults(2));
    }

    #[test]
    fn missing_backup_is_an_error() {
        let backend = InMemoryBackend::new();
        let paths = BankPaths::new("main").unwrap();
        assert!(matches!(
            read_backup(&backend, &paths),
            Err(CoreError::Storage(_))
        ));
    }

    #[test]
    fn write_failure_is_reported() {
        let mut backend = InMemoryBackend::new();
        backend.fail_writes(true);
        let paths = BankPaths::new("main").unwrap();
        let result = write_backup(&mut backend, &paths, &BankImage::create(1), &BoxNames::default());
        assert!(result.is_err());
    }
}
