//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The requested object does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The relative path that was requested.
        path: String,
    },

    /// The path escapes the backend root or is otherwise unusable.
    #[error("invalid storage path: {path}")]
    InvalidPath {
        /// The offending path.
        path: String,
    },
}

impl StorageError {
    /// Returns true if this error means the object is simply absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Io(e) => e.kind() == io::ErrorKind::NotFound,
            Self::InvalidPath { .. } => false,
        }
    }
}
