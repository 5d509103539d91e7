//! # pkbank core
//!
//! Storage engine for banks of creature records.
//!
//! This crate provides:
//! - The versioned bank file format (header plus fixed-size entries)
//! - Entity records for five generations and their 260-byte encoding
//! - Backend selection between removable and archive storage
//! - Conversion of the pre-versioned monolithic bank
//! - Resize, backup, box names and change detection
//!
//! ## Example
//!
//! ```rust
//! use pkbank_core::{Bank, Backends, Config, Entity, Generation, Hooks};
//! use pkbank_storage::InMemoryBackend;
//!
//! let backends = Backends::new(InMemoryBackend::new(), InMemoryBackend::new());
//! let config = Config::default().box_count(2);
//! let mut bank = Bank::open("main", config, backends, Hooks::default()).unwrap();
//!
//! let mut data = vec![0u8; 232];
//! data[0] = 1;
//! data[8] = 25;
//! let entity = Entity::new(Generation::Seven, data).unwrap();
//!
//! bank.set_entity(1, 29, &entity).unwrap();
//! bank.save().unwrap();
//! assert_eq!(bank.entity(1, 29).unwrap(), entity);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bank;
pub mod backup;
mod change;
mod config;
pub mod entity;
mod error;
pub mod format;
pub mod layout;
pub mod migration;
mod names;
mod notify;
pub mod selector;

pub use bank::{Bank, Hooks};
pub use change::{digest, ChangeDetector, Digest};
pub use config::Config;
pub use entity::{Entity, Generation, GrowthRate, Record, SpeciesData};
pub use error::{CoreError, CoreResult};
pub use format::{BankImage, SLOTS_PER_BOX};
pub use layout::{BackendKind, BankPaths, Backends};
pub use names::{default_name, BoxNames};
pub use notify::{Notice, Notifier, NullNotifier, TracingNotifier};
pub use selector::LoadPlan;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
