//! Fuzz testing harnesses for pkbank.
//!
//! This module provides fuzz targets that can be used with cargo-fuzz
//! or other fuzzing frameworks.

use crate::fixtures::{quiet_config, TestStorage};
use pkbank_core::format::{BankImage, BANK_MAGIC};
use pkbank_core::layout::LEGACY_BANK_PATH;
use pkbank_core::migration::{self, legacy_box_count};
use pkbank_core::{Entity, Generation, SLOTS_PER_BOX};
use pkbank_storage::StorageBackend;

/// Fuzz target for bank parsing.
///
/// Arbitrary bytes must either parse into an image of exactly the size its
/// header claims, or return an error. No panics.
pub fn fuzz_bank_parse(data: &[u8]) {
    if let Ok(parsed) = BankImage::parse(data.to_vec()) {
        let image = parsed.image;
        assert_eq!(
            image.as_bytes().len(),
            pkbank_core::format::image_size(image.boxes()),
            "Parsed image size disagrees with its header"
        );
        for index in 0..image.entry_count() {
            let _ = image.entity(index);
        }
    }
}

/// Fuzz target for bank parsing behind a valid magic.
///
/// Most random inputs fail the magic check; this one exercises the version
/// and size logic instead.
pub fn fuzz_bank_parse_with_magic(data: &[u8]) {
    let mut bytes = BANK_MAGIC.to_vec();
    bytes.extend_from_slice(data);
    fuzz_bank_parse(&bytes);
}

/// Fuzz target for legacy conversion.
pub fn fuzz_legacy_convert(data: &[u8]) {
    let boxes = legacy_box_count(data.len()).max(1);
    let conversion = migration::convert(data, boxes, None).expect("Conversion of whole records");
    let report = conversion.report;
    let copied = legacy_box_count(data.len()) as usize * SLOTS_PER_BOX as usize;
    assert_eq!(report.empty + report.gen6 + report.gen7, copied);
}

/// Fuzz target for entity decoding.
///
/// Every payload decodes to some entity, and re-encoding it keeps the
/// entity's own bytes.
pub fn fuzz_entity_decode(data: &[u8]) {
    let Some((&tag, rest)) = data.split_first() else {
        return;
    };
    let Some(generation) = Generation::from_tag(u32::from(tag % 5)) else {
        return;
    };
    let mut payload = [0xFF; pkbank_core::entity::PAYLOAD_SIZE];
    let len = rest.len().min(payload.len());
    payload[..len].copy_from_slice(&rest[..len]);

    let entity = Entity::decode(generation, &payload);
    let encoded = entity.encode();
    assert_eq!(&encoded[..entity.raw().len()], entity.raw());
}

/// Fuzz target for opening a bank from arbitrary storage contents.
///
/// Opening must succeed (replacing corrupt data) unless the bytes claim an
/// unsupported version.
pub fn fuzz_bank_open(data: &[u8]) {
    let storage = TestStorage::new();
    let mut archive = storage.archive.clone();
    if archive.write("banks/fuzz.bnk", data).is_err() {
        return;
    }
    if let Ok(mut bank) = storage.try_open("fuzz", quiet_config()) {
        let _ = bank.is_dirty();
        let _ = bank.entity(0, 0);
    }
}

/// Fuzz target for opening the legacy bank.
pub fn fuzz_legacy_open(data: &[u8]) {
    let storage = TestStorage::new();
    let mut removable = storage.removable.clone();
    if removable.write(LEGACY_BANK_PATH, data).is_err() {
        return;
    }
    let bank = storage.open(pkbank_core::layout::LEGACY_BANK_NAME, quiet_config());
    assert!(bank.boxes() >= 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuzz_parse_empty() {
        fuzz_bank_parse(&[]);
    }

    #[test]
    fn fuzz_parse_garbage() {
        fuzz_bank_parse(&[0xAB; 100]);
        fuzz_bank_parse_with_magic(&[0xAB; 100]);
    }

    #[test]
    fn fuzz_parse_versions() {
        for version in 0u32..4 {
            let mut data = version.to_le_bytes().to_vec();
            data.extend_from_slice(&1u32.to_le_bytes());
            data.resize(20_000, 0x11);
            fuzz_bank_parse_with_magic(&data);
        }
    }

    #[test]
    fn fuzz_legacy_sizes() {
        fuzz_legacy_convert(&[]);
        fuzz_legacy_convert(&[0x42; 232 * 30 + 17]);
        fuzz_legacy_convert(&[0x01; 232 * 60]);
    }

    #[test]
    fn fuzz_entity_all_generations() {
        for tag in 0u8..5 {
            fuzz_entity_decode(&[tag]);
            let mut data = vec![tag];
            data.extend(std::iter::repeat(0x10).take(300));
            fuzz_entity_decode(&data);
        }
    }

    #[test]
    fn fuzz_open_garbage() {
        fuzz_bank_open(&[]);
        fuzz_bank_open(b"PKSMBANK");
        fuzz_bank_open(&[0x55; 4000]);
    }

    #[test]
    fn fuzz_legacy_open_short() {
        fuzz_legacy_open(&[]);
        fuzz_legacy_open(&[0x99; 500]);
    }
}
