//! Error types for the bank engine.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in bank operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] pkbank_storage::StorageError),

    /// JSON encoding or decoding failed (box names, configuration).
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The bank file does not carry a valid header.
    #[error("corrupt bank: {message}")]
    CorruptFormat {
        /// Description of the corruption.
        message: String,
    },

    /// The bank file was written by a format version this build cannot read.
    #[error("unsupported bank version {version}")]
    UnsupportedVersion {
        /// Version found in the header.
        version: u32,
    },

    /// A slot address lies outside the bank.
    #[error("slot {slot} of box {box_index} is outside a bank of {boxes} boxes")]
    SlotOutOfRange {
        /// Requested box.
        box_index: u32,
        /// Requested slot.
        slot: u32,
        /// Boxes in the bank.
        boxes: u32,
    },

    /// A box index lies outside the bank.
    #[error("box {box_index} is outside a bank of {boxes} boxes")]
    BoxOutOfRange {
        /// Requested box.
        box_index: u32,
        /// Boxes in the bank.
        boxes: u32,
    },

    /// An entity payload has a length its generation cannot have.
    #[error("invalid entity: {message}")]
    InvalidEntity {
        /// Description of the problem.
        message: String,
    },

    /// Legacy conversion failed.
    #[error("migration failed: {message}")]
    MigrationFailed {
        /// Description of the failure.
        message: String,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates a corrupt format error.
    pub fn corrupt_format(message: impl Into<String>) -> Self {
        Self::CorruptFormat {
            message: message.into(),
        }
    }

    /// Creates an invalid entity error.
    pub fn invalid_entity(message: impl Into<String>) -> Self {
        Self::InvalidEntity {
            message: message.into(),
        }
    }

    /// Creates a migration failed error.
    pub fn migration_failed(message: impl Into<String>) -> Self {
        Self::MigrationFailed {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true if the error is recoverable by synthesizing a fresh bank.
    #[must_use]
    pub fn is_recoverable_on_load(&self) -> bool {
        matches!(self, Self::CorruptFormat { .. } | Self::Storage(_))
    }
}

impl From<io::Error> for CoreError {
    fn from(e: io::Error) -> Self {
        Self::Storage(pkbank_storage::StorageError::Io(e))
    }
}
