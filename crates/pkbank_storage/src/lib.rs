//! # pkbank storage
//!
//! Storage backend trait and implementations for pkbank.
//!
//! Backends are **opaque object stores** keyed by relative paths. They know
//! nothing about bank headers, entries or box names; the core crate owns all
//! format interpretation.
//!
//! ## Design Principles
//!
//! - Whole-object operations only (read, write, exists, delete)
//! - A write fully replaces the previous object or leaves it untouched
//! - Deleting a missing object is not an error
//! - Must be `Send + Sync`
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - Persistent storage rooted at a directory
//!
//! ## Example
//!
//! ```rust
//! use pkbank_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! backend.write("banks/pksm_1.bnk", b"hello world").unwrap();
//! assert!(backend.exists("banks/pksm_1.bnk"));
//! assert_eq!(backend.read("banks/pksm_1.bnk").unwrap(), b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
