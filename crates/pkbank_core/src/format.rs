//! On-disk bank layout.
//!
//! ```text
//! | magic (8) | version (4) | boxes (4) | entry * boxes * 30 |
//! entry = | generation tag (4) | payload (260) |
//! ```
//!
//! All integers are little-endian. Version 1 files lack the `boxes` field;
//! their box count is inferred from the file length and they are upgraded to
//! the current layout on parse.

use crate::entity::{Entity, Generation, PAYLOAD_SIZE, SENTINEL, UNUSED_TAG};
use crate::error::{CoreError, CoreResult};
use tracing::warn;

/// Magic bytes at the start of every bank file.
pub const BANK_MAGIC: [u8; 8] = *b"PKSMBANK";

/// Current bank format version.
pub const BANK_VERSION: u32 = 2;

/// The version whose header lacks a box count.
pub const LEGACY_BANK_VERSION: u32 = 1;

/// Header size (magic + version + boxes).
pub const HEADER_SIZE: usize = 8 + 4 + 4;

/// Header size of version 1 files (magic + version).
const LEGACY_HEADER_SIZE: usize = 8 + 4;

/// Width of the generation tag in front of each payload.
pub const TAG_SIZE: usize = 4;

/// Size of one entry.
pub const ENTRY_SIZE: usize = TAG_SIZE + PAYLOAD_SIZE;

/// Slots in every box.
pub const SLOTS_PER_BOX: u32 = 30;

const BOX_SIZE: usize = ENTRY_SIZE * SLOTS_PER_BOX as usize;

/// Returns the exact image size of a bank with `boxes` boxes.
#[must_use]
pub fn image_size(boxes: u32) -> usize {
    HEADER_SIZE + BOX_SIZE * boxes as usize
}

/// Decoded bank header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankHeader {
    /// Format version.
    pub version: u32,
    /// Number of boxes.
    pub boxes: u32,
}

impl BankHeader {
    /// Encodes the header, magic included.
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..8].copy_from_slice(&BANK_MAGIC);
        buf[8..12].copy_from_slice(&self.version.to_le_bytes());
        buf[12..16].copy_from_slice(&self.boxes.to_le_bytes());
        buf
    }

    /// Decodes a current-version header.
    ///
    /// # Errors
    ///
    /// Returns `CorruptFormat` if the data is short or the magic is wrong.
    pub fn decode(data: &[u8]) -> CoreResult<Self> {
        if data.len() < HEADER_SIZE {
            return Err(CoreError::corrupt_format("bank header too short"));
        }
        check_magic(data)?;
        Ok(Self {
            version: read_u32_at(data, 8),
            boxes: read_u32_at(data, 12),
        })
    }
}

fn check_magic(data: &[u8]) -> CoreResult<()> {
    if data.len() < BANK_MAGIC.len() || data[..BANK_MAGIC.len()] != BANK_MAGIC {
        return Err(CoreError::corrupt_format("invalid bank magic"));
    }
    Ok(())
}

fn read_u32_at(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Result of parsing a bank file.
#[derive(Debug)]
pub struct Parsed {
    /// The bank, in the current layout.
    pub image: BankImage,
    /// True if the image differs from the bytes read and should be rewritten.
    pub needs_save: bool,
}

/// A complete bank in the current layout: header followed by every entry.
///
/// The buffer length always equals [`image_size`] of the header's box count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankImage {
    bytes: Vec<u8>,
}

impl BankImage {
    /// Creates an empty bank of `boxes` boxes, every entry sentinel-filled.
    #[must_use]
    pub fn create(boxes: u32) -> Self {
        let mut bytes = vec![SENTINEL; image_size(boxes)];
        bytes[..HEADER_SIZE].copy_from_slice(
            &BankHeader {
                version: BANK_VERSION,
                boxes,
            }
            .encode(),
        );
        Self { bytes }
    }

    /// Parses a bank file, upgrading legacy layouts.
    ///
    /// # Errors
    ///
    /// - `CorruptFormat` if the magic is wrong or the file is truncated
    /// - `UnsupportedVersion` for versions other than 1 and the current one
    pub fn parse(bytes: Vec<u8>) -> CoreResult<Parsed> {
        if bytes.len() < LEGACY_HEADER_SIZE {
            return Err(CoreError::corrupt_format(format!(
                "bank file too short: {} bytes",
                bytes.len()
            )));
        }
        check_magic(&bytes)?;

        match read_u32_at(&bytes, 8) {
            LEGACY_BANK_VERSION => Self::upgrade_v1(&bytes),
            BANK_VERSION => Self::parse_current(bytes),
            version => Err(CoreError::UnsupportedVersion { version }),
        }
    }

    fn upgrade_v1(bytes: &[u8]) -> CoreResult<Parsed> {
        let entries = &bytes[LEGACY_HEADER_SIZE..];
        let boxes = u32::try_from(entries.len() / BOX_SIZE).unwrap_or(u32::MAX);
        if boxes == 0 {
            return Err(CoreError::corrupt_format(format!(
                "version 1 bank holds no whole box: {} entry bytes",
                entries.len()
            )));
        }
        let kept = BOX_SIZE * boxes as usize;
        if kept != entries.len() {
            warn!(
                trailing = entries.len() - kept,
                "dropping partial box from version 1 bank"
            );
        }

        let mut upgraded = Vec::with_capacity(image_size(boxes));
        upgraded.extend_from_slice(
            &BankHeader {
                version: BANK_VERSION,
                boxes,
            }
            .encode(),
        );
        upgraded.extend_from_slice(&entries[..kept]);

        Ok(Parsed {
            image: Self { bytes: upgraded },
            needs_save: true,
        })
    }

    fn parse_current(mut bytes: Vec<u8>) -> CoreResult<Parsed> {
        let header = BankHeader::decode(&bytes)?;
        if header.boxes == 0 {
            return Err(CoreError::corrupt_format("bank header claims zero boxes"));
        }
        let expected = (header.boxes as usize)
            .checked_mul(BOX_SIZE)
            .and_then(|n| n.checked_add(HEADER_SIZE))
            .ok_or_else(|| CoreError::corrupt_format("box count overflows"))?;

        if bytes.len() < expected {
            return Err(CoreError::corrupt_format(format!(
                "bank truncated: {} boxes need {expected} bytes, found {}",
                header.boxes,
                bytes.len()
            )));
        }

        let needs_save = bytes.len() > expected;
        if needs_save {
            warn!(
                trailing = bytes.len() - expected,
                "ignoring bytes past the last box"
            );
            bytes.truncate(expected);
        }

        Ok(Parsed {
            image: Self { bytes },
            needs_save,
        })
    }

    /// Returns the serialized bank: header and entries, nothing else.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the image, returning its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Returns the decoded header.
    #[must_use]
    pub fn header(&self) -> BankHeader {
        BankHeader {
            version: read_u32_at(&self.bytes, 8),
            boxes: read_u32_at(&self.bytes, 12),
        }
    }

    /// Returns the number of boxes.
    #[must_use]
    pub fn boxes(&self) -> u32 {
        self.header().boxes
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        (self.bytes.len() - HEADER_SIZE) / ENTRY_SIZE
    }

    fn entry_range(&self, index: usize) -> Option<std::ops::Range<usize>> {
        (index < self.entry_count()).then(|| {
            let start = HEADER_SIZE + index * ENTRY_SIZE;
            start..start + ENTRY_SIZE
        })
    }

    /// Reads the tag and payload of entry `index`.
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<(u32, &[u8; PAYLOAD_SIZE])> {
        let range = self.entry_range(index)?;
        let entry = &self.bytes[range];
        let payload: &[u8; PAYLOAD_SIZE] = entry[TAG_SIZE..].try_into().ok()?;
        Some((read_u32_at(entry, 0), payload))
    }

    /// Overwrites entry `index`. Returns false if it does not exist.
    pub fn write_entry(&mut self, index: usize, tag: u32, payload: &[u8; PAYLOAD_SIZE]) -> bool {
        let Some(range) = self.entry_range(index) else {
            return false;
        };
        let entry = &mut self.bytes[range];
        entry[..TAG_SIZE].copy_from_slice(&tag.to_le_bytes());
        entry[TAG_SIZE..].copy_from_slice(payload);
        true
    }

    /// Fills entry `index` with the sentinel. Returns false if it does not exist.
    pub fn clear_entry(&mut self, index: usize) -> bool {
        let Some(range) = self.entry_range(index) else {
            return false;
        };
        self.bytes[range].fill(SENTINEL);
        true
    }

    /// Whether entry `index` holds an entity.
    #[must_use]
    pub fn is_occupied(&self, index: usize) -> bool {
        self.entry(index).is_some_and(|(tag, _)| tag != UNUSED_TAG)
    }

    /// Decodes entry `index` into an independent entity.
    ///
    /// Unused entries, and entries with a tag this build does not know,
    /// decode to [`Entity::empty`].
    #[must_use]
    pub fn entity(&self, index: usize) -> Option<Entity> {
        let (tag, payload) = self.entry(index)?;
        Some(match Generation::from_tag(tag) {
            Some(generation) => Entity::decode(generation, payload),
            None => Entity::empty(),
        })
    }

    /// Stores `entity` in entry `index`. Returns false if it does not exist.
    ///
    /// An entity whose identity field is zero clears the entry instead.
    pub fn set_entity(&mut self, index: usize, entity: &Entity) -> bool {
        if entity.is_empty() {
            return self.clear_entry(index);
        }
        self.write_entry(index, entity.generation().tag(), &entity.encode())
    }

    /// Returns a copy reshaped to `boxes` boxes.
    ///
    /// Existing entries up to the new capacity are kept; new entries are
    /// sentinel-filled.
    #[must_use]
    pub fn resized(&self, boxes: u32) -> Self {
        let new_size = image_size(boxes);
        let mut bytes = vec![SENTINEL; new_size];
        let keep = new_size.min(self.bytes.len());
        bytes[..keep].copy_from_slice(&self.bytes[..keep]);
        bytes[12..16].copy_from_slice(&boxes.to_le_bytes());
        Self { bytes }
    }
}
