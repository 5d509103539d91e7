//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An in-memory storage backend.
///
/// Clones share the same contents, so a test can hand one clone to a bank
/// and inspect what the bank persisted through another.
///
/// # Example
///
/// ```rust
/// use pkbank_storage::{StorageBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::new();
/// let mut writer = backend.clone();
/// writer.write("banks/a.bnk", b"test data").unwrap();
/// assert_eq!(backend.read("banks/a.bnk").unwrap(), b"test data");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    objects: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-populated with a single object.
    ///
    /// Useful for testing load and migration scenarios.
    #[must_use]
    pub fn with_object(path: &str, data: Vec<u8>) -> Self {
        let backend = Self::new();
        backend.objects.write().insert(path.to_string(), data);
        backend
    }

    /// Returns the paths of all stored objects, in order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.objects.read().keys().cloned().collect()
    }

    /// Makes every subsequent `write` fail with an I/O error (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `read` of an existing object fail with an I/O error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Clears all data from the backend.
    pub fn clear(&self) {
        self.objects.write().clear();
    }
}

impl StorageBackend for InMemoryBackend {
    fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        if self.fail_reads.load(Ordering::SeqCst) && self.exists(path) {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::Other,
                format!("injected read failure for {path}"),
            )));
        }
        self.objects
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                path: path.to_string(),
            })
    }

    fn write(&mut self, path: &str, data: &[u8]) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("injected write failure for {path}"),
            )));
        }
        self.objects.write().insert(path.to_string(), data.to_vec());
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.objects.read().contains_key(path)
    }

    fn delete(&mut self, path: &str) -> StorageResult<()> {
        self.objects.write().remove(path);
        Ok(())
    }
}
