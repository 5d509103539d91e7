//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

/// Suffix of the scratch file a write goes through before being renamed.
const TEMP_SUFFIX: &str = ".tmp";

/// A directory-rooted storage backend.
///
/// Every object lives at `<root>/<path>`. Writes go through a temporary
/// sibling file that is synced and then renamed over the target, so a crash
/// mid-write leaves either the old or the new object, never a torn one.
///
/// # Example
///
/// ```no_run
/// use pkbank_storage::{StorageBackend, FileBackend};
///
/// let mut backend = FileBackend::new("/3ds/PKSM");
/// backend.write("banks/pksm_1.json", b"[]").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Creates a backend rooted at `root`.
    ///
    /// The directory does not need to exist yet; it is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a relative object path to a filesystem path under the root.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` for empty, absolute or parent-escaping paths.
    pub fn resolve(&self, path: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(path);
        let valid = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !valid {
            return Err(StorageError::InvalidPath {
                path: path.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        let full = self.resolve(path)?;
        match fs::read(&full) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StorageError::NotFound {
                path: path.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, path: &str, data: &[u8]) -> StorageResult<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut temp_name = full.as_os_str().to_owned();
        temp_name.push(TEMP_SUFFIX);
        let temp_path = PathBuf::from(temp_name);

        let result = (|| -> io::Result<()> {
            let mut file = File::create(&temp_path)?;
            file.write_all(data)?;
            file.sync_all()?;
            drop(file);
            fs::rename(&temp_path, &full)
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }

    fn delete(&mut self, path: &str) -> StorageResult<()> {
        let full = self.resolve(path)?;
        match fs::remove_file(&full) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_write_and_read() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path());

        backend.write("banks/test.bnk", b"hello world").unwrap();

        assert!(dir.path().join("banks").join("test.bnk").exists());
        assert_eq!(backend.read("banks/test.bnk").unwrap(), b"hello world");
    }

    #[test]
    fn file_read_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        let result = backend.read("banks/missing.bnk");
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn file_write_replaces_whole_object() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path());

        backend.write("a.bin", b"a much longer first version").unwrap();
        backend.write("a.bin", b"short").unwrap();

        assert_eq!(backend.read("a.bin").unwrap(), b"short");
    }

    #[test]
    fn file_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path());

        backend.write("banks/x.json", b"[]").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path().join("banks"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["x.json".to_string()]);
    }

    #[test]
    fn file_exists_and_delete() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path());

        assert!(!backend.exists("banks/x.bnk"));
        backend.write("banks/x.bnk", b"data").unwrap();
        assert!(backend.exists("banks/x.bnk"));

        backend.delete("banks/x.bnk").unwrap();
        assert!(!backend.exists("banks/x.bnk"));
    }

    #[test]
    fn file_delete_missing_succeeds() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path());
        assert!(backend.delete("nothing/here.bin").is_ok());
    }

    #[test]
    fn file_directory_is_not_an_object() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path());
        backend.write("banks/x.bnk", b"data").unwrap();
        assert!(!backend.exists("banks"));
    }

    #[test]
    fn file_rejects_escaping_paths() {
        let dir = tempdir().unwrap();
        let mut backend = FileBackend::new(dir.path());

        for path in ["", "../outside.bin", "/etc/passwd", "banks/../../x"] {
            let result = backend.write(path, b"x");
            assert!(
                matches!(result, Err(StorageError::InvalidPath { .. })),
                "path {path:?} should be rejected"
            );
        }
        assert!(!backend.exists("../outside.bin"));
    }

    #[test]
    fn file_persistence_across_instances() {
        let dir = tempdir().unwrap();

        {
            let mut backend = FileBackend::new(dir.path());
            backend.write("banks/p.bnk", b"persistent data").unwrap();
        }

        let backend = FileBackend::new(dir.path());
        assert_eq!(backend.read("banks/p.bnk").unwrap(), b"persistent data");
        assert_eq!(backend.root(), dir.path());
    }
}
