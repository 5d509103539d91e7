//! Storage backend trait definition.

use crate::error::StorageResult;

/// A physical storage location for bank files.
///
/// Storage backends are **opaque object stores**. Each object is addressed by
/// a relative, `/`-separated path such as `banks/pksm_1.bnk`. The bank engine
/// owns all format interpretation.
///
/// # Invariants
///
/// - `read` returns exactly the bytes of the last successful `write`
/// - `write` replaces the whole object; a failed write leaves the previous
///   object intact
/// - `delete` of a missing object succeeds
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Reads the whole object at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`](crate::StorageError::NotFound) if
    /// the object does not exist, or an I/O error.
    fn read(&self, path: &str) -> StorageResult<Vec<u8>>;

    /// Replaces the object at `path` with `data`.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the object cannot be written.
    fn write(&mut self, path: &str, data: &[u8]) -> StorageResult<()>;

    /// Returns true if an object exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Removes the object at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing object could not be removed.
    fn delete(&mut self, path: &str) -> StorageResult<()>;
}
