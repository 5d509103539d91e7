//! # pkbank Testkit
//!
//! Test utilities for pkbank.
//!
//! This crate provides:
//! - In-memory and temporary-directory storage fixtures
//! - Builders for entities, version 1 banks and legacy bank files
//! - Property-based test generators using proptest
//! - A model-checking harness for bank operations
//! - Fuzz testing harnesses
//!
//! ## Usage
//!
//! ```rust
//! use pkbank_testkit::prelude::*;
//!
//! let storage = TestStorage::new();
//! let mut bank = storage.open("main", quiet_config());
//! bank.set_entity(0, 0, &sample_entity(25, 1)).unwrap();
//! assert!(bank.is_dirty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod integration;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
}

pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use integration::*;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn random_operations_match_model(ops in operation_sequence_strategy(2, 1, 40)) {
            let mut harness = BankHarness::new(2);
            for op in &ops {
                harness.apply(op);
            }
            harness.verify_all();
            harness.save_and_reopen();
            harness.verify_all();
        }
    }
}
