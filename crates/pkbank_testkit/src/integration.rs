//! Cross-crate integration test helpers.
//!
//! [`BankHarness`] mirrors every mutation in a simple model and checks the
//! real bank against it, including after the bank is reopened from storage.

use crate::fixtures::{quiet_config, TestStorage};
use crate::generators::BankOperation;
use pkbank_core::{default_name, Bank, Config, Entity, SLOTS_PER_BOX};
use std::collections::HashMap;

/// A test harness for integration testing.
pub struct BankHarness {
    /// Storage the bank lives in.
    pub storage: TestStorage,
    /// The bank under test.
    pub bank: Bank,
    name: String,
    config: Config,
    entities: HashMap<(u32, u32), Entity>,
    names: HashMap<u32, String>,
}

impl BankHarness {
    /// Opens a fresh in-memory bank of `boxes` boxes.
    pub fn new(boxes: u32) -> Self {
        let storage = TestStorage::new();
        let config = quiet_config().box_count(boxes);
        let bank = storage.open("harness", config.clone());
        Self {
            storage,
            bank,
            name: "harness".to_string(),
            config,
            entities: HashMap::new(),
            names: HashMap::new(),
        }
    }

    /// Stores an entity and tracks it.
    pub fn set(&mut self, box_index: u32, slot: u32, entity: Entity) {
        self.bank
            .set_entity(box_index, slot, &entity)
            .expect("Failed to set entity");
        if entity.is_empty() {
            self.entities.remove(&(box_index, slot));
        } else {
            self.entities.insert((box_index, slot), entity);
        }
    }

    /// Empties a slot.
    pub fn clear(&mut self, box_index: u32, slot: u32) {
        self.set(box_index, slot, Entity::empty());
    }

    /// Renames a box and tracks it.
    pub fn rename(&mut self, box_index: u32, name: &str) {
        self.bank
            .set_box_name(box_index, name)
            .expect("Failed to rename box");
        self.names.insert(box_index, name.to_string());
    }

    /// Applies a generated operation.
    pub fn apply(&mut self, op: &BankOperation) {
        match op {
            BankOperation::Set {
                box_index,
                slot,
                entity,
            } => self.set(*box_index, *slot, entity.clone()),
            BankOperation::Clear { box_index, slot } => self.clear(*box_index, *slot),
            BankOperation::Rename { box_index, name } => self.rename(*box_index, name),
        }
    }

    /// Resizes the bank, forgetting tracked state beyond the new size.
    pub fn resize(&mut self, boxes: u32) {
        self.bank.resize(boxes).expect("Failed to resize bank");
        self.entities.retain(|(b, _), _| *b < boxes);
        self.config.box_count = boxes;
    }

    /// Saves and opens the bank again from storage.
    pub fn save_and_reopen(&mut self) {
        self.bank.save().expect("Failed to save bank");
        self.bank = self.storage.open(&self.name, self.config.clone());
    }

    /// Number of tracked entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Checks every slot and box name against the model.
    pub fn verify_all(&self) {
        for box_index in 0..self.bank.boxes() {
            for slot in 0..SLOTS_PER_BOX {
                let actual = self.bank.entity(box_index, slot).expect("Slot in range");
                match self.entities.get(&(box_index, slot)) {
                    Some(expected) => assert_eq!(
                        &actual, expected,
                        "Entity mismatch at box {box_index} slot {slot}"
                    ),
                    None => assert!(
                        actual.is_empty(),
                        "Expected empty slot at box {box_index} slot {slot}"
                    ),
                }
            }

            let expected_name = self
                .names
                .get(&box_index)
                .cloned()
                .unwrap_or_else(|| default_name(box_index));
            assert_eq!(
                self.bank.box_name(box_index).expect("Box in range"),
                expected_name
            );
        }
        assert_eq!(self.bank.occupied_slots(), self.entities.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_entity;

    #[test]
    fn harness_tracks_sets_and_clears() {
        let mut harness = BankHarness::new(2);
        harness.set(0, 0, sample_entity(1, 1));
        harness.set(1, 29, sample_entity(2, 2));
        harness.clear(0, 0);
        harness.verify_all();
        assert_eq!(harness.entity_count(), 1);
    }

    #[test]
    fn harness_survives_reopen() {
        let mut harness = BankHarness::new(2);
        harness.set(1, 5, sample_entity(151, 7));
        harness.rename(1, "Legends");
        harness.save_and_reopen();
        harness.verify_all();
    }
}
