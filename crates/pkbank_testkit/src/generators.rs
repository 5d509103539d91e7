//! Property-based test generators using proptest.
//!
//! Provides strategies for generating entities, slot addresses and operation
//! sequences that stay within a bank's invariants.

use pkbank_core::{Entity, Generation, SLOTS_PER_BOX};
use proptest::prelude::*;

/// Strategy for any supported generation.
pub fn generation_strategy() -> impl Strategy<Value = Generation> {
    prop::sample::select(Generation::ALL.to_vec())
}

/// Strategy for non-empty entities of any generation, in either form.
pub fn entity_strategy() -> impl Strategy<Value = Entity> {
    (generation_strategy(), any::<bool>()).prop_flat_map(|(generation, party)| {
        let len = if party {
            generation.party_len()
        } else {
            generation.box_len()
        };
        (1u16.., prop::collection::vec(any::<u8>(), len..=len)).prop_map(
            move |(species, mut data)| {
                data[8..10].copy_from_slice(&species.to_le_bytes());
                Entity::new(generation, data).expect("Generated entity has a valid length")
            },
        )
    })
}

/// Strategy for a `(box, slot)` address inside a bank of `boxes` boxes.
pub fn slot_strategy(boxes: u32) -> impl Strategy<Value = (u32, u32)> {
    (0..boxes, 0..SLOTS_PER_BOX)
}

/// Strategy for box names.
pub fn box_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9 ]{0,16}").expect("Invalid regex")
}

/// A single mutation of a bank.
#[derive(Debug, Clone)]
pub enum BankOperation {
    /// Store an entity.
    Set {
        /// Box index.
        box_index: u32,
        /// Slot within the box.
        slot: u32,
        /// Entity to store.
        entity: Entity,
    },
    /// Empty a slot.
    Clear {
        /// Box index.
        box_index: u32,
        /// Slot within the box.
        slot: u32,
    },
    /// Rename a box.
    Rename {
        /// Box index.
        box_index: u32,
        /// New name.
        name: String,
    },
}

/// Strategy for operations on a bank of `boxes` boxes.
pub fn bank_operation_strategy(boxes: u32) -> impl Strategy<Value = BankOperation> {
    prop_oneof![
        4 => (slot_strategy(boxes), entity_strategy()).prop_map(|((box_index, slot), entity)| {
            BankOperation::Set { box_index, slot, entity }
        }),
        2 => slot_strategy(boxes)
            .prop_map(|(box_index, slot)| BankOperation::Clear { box_index, slot }),
        1 => (0..boxes, box_name_strategy())
            .prop_map(|(box_index, name)| BankOperation::Rename { box_index, name }),
    ]
}

/// Strategy for a sequence of operations.
pub fn operation_sequence_strategy(
    boxes: u32,
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<BankOperation>> {
    prop::collection::vec(bank_operation_strategy(boxes), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn generated_entities_are_storable(entity in entity_strategy()) {
            prop_assert!(!entity.is_empty());
            let decoded = Entity::decode(entity.generation(), &entity.encode());
            prop_assert_eq!(decoded.generation(), entity.generation());
        }

        #[test]
        fn slots_are_in_range((b, s) in slot_strategy(3)) {
            prop_assert!(b < 3);
            prop_assert!(s < SLOTS_PER_BOX);
        }
    }
}
