//! Entities stored in bank slots.
//!
//! The bank treats an entity as a generation tag plus an opaque byte
//! payload. Only the handful of fields the engine itself needs (the identity
//! field and a few legacy-conversion inputs) are read here; everything else is
//! left to the codec layer above.

mod generation;
mod growth;

pub use generation::{Generation, UNUSED_TAG};
pub use growth::{GrowthRate, SpeciesData, MAX_LEVEL};

use crate::error::{CoreError, CoreResult};

/// Fixed payload size of a bank entry: the largest supported encoding.
pub const PAYLOAD_SIZE: usize = 260;

/// Fill byte for unused payload space and empty entries.
pub const SENTINEL: u8 = 0xFF;

const ENCRYPTION_CONSTANT_OFFSET: usize = 0x00;
const SPECIES_OFFSET: usize = 0x08;

/// Raw bytes of one entity plus whether they are the team-member form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    data: Vec<u8>,
    party: bool,
}

impl Record {
    /// Returns the encoded bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the bytes are the team-member encoding.
    #[must_use]
    pub fn is_party(&self) -> bool {
        self.party
    }
}

/// An entity of one of the supported generations.
///
/// Values are always independent copies: nothing handed out by the bank
/// aliases its buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    /// Gen 4 entity.
    Pk4(Record),
    /// Gen 5 entity.
    Pk5(Record),
    /// Gen 6 entity.
    Pk6(Record),
    /// Gen 7 entity.
    Pk7(Record),
    /// Let's Go entity.
    Pb7(Record),
}

impl Entity {
    /// Wraps encoded bytes as an entity of `generation`.
    ///
    /// The length decides between the stored-only and team-member forms.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEntity` if `data` has neither valid length.
    pub fn new(generation: Generation, data: Vec<u8>) -> CoreResult<Self> {
        let party = if data.len() == generation.box_len() {
            false
        } else if data.len() == generation.party_len() {
            true
        } else {
            return Err(CoreError::invalid_entity(format!(
                "{generation} entity must be {} or {} bytes, got {}",
                generation.box_len(),
                generation.party_len(),
                data.len()
            )));
        };
        Ok(Self::from_record(
            generation,
            Record {
                data,
                party: party && generation.has_party_region(),
            },
        ))
    }

    /// The canonical empty entity returned for unused slots.
    #[must_use]
    pub fn empty() -> Self {
        Self::Pk7(Record {
            data: vec![0; Generation::Seven.box_len()],
            party: false,
        })
    }

    /// Decodes a full entry payload tagged with `generation`.
    ///
    /// The trailing team-member region is scanned from the end; any
    /// non-sentinel byte there selects the team-member form.
    #[must_use]
    pub fn decode(generation: Generation, payload: &[u8; PAYLOAD_SIZE]) -> Self {
        let party = generation.has_party_region()
            && payload[generation.box_len()..]
                .iter()
                .rev()
                .any(|&b| b != SENTINEL);
        let len = if party {
            generation.party_len()
        } else {
            generation.box_len()
        };
        Self::from_record(
            generation,
            Record {
                data: payload[..len].to_vec(),
                party,
            },
        )
    }

    /// Encodes the entity into a full payload, padding with the sentinel.
    #[must_use]
    pub fn encode(&self) -> [u8; PAYLOAD_SIZE] {
        let mut payload = [SENTINEL; PAYLOAD_SIZE];
        let raw = self.raw();
        payload[..raw.len()].copy_from_slice(raw);
        payload
    }

    /// Reinterprets the same bytes under another generation's encoding.
    ///
    /// # Errors
    ///
    /// Returns `InvalidEntity` if the length is not valid for `generation`.
    pub fn reencode(&self, generation: Generation) -> CoreResult<Self> {
        Self::new(generation, self.raw().to_vec())
    }

    fn from_record(generation: Generation, record: Record) -> Self {
        match generation {
            Generation::Four => Self::Pk4(record),
            Generation::Five => Self::Pk5(record),
            Generation::Six => Self::Pk6(record),
            Generation::Seven => Self::Pk7(record),
            Generation::Lgpe => Self::Pb7(record),
        }
    }

    fn record(&self) -> &Record {
        match self {
            Self::Pk4(r) | Self::Pk5(r) | Self::Pk6(r) | Self::Pk7(r) | Self::Pb7(r) => r,
        }
    }

    fn record_mut(&mut self) -> &mut Record {
        match self {
            Self::Pk4(r) | Self::Pk5(r) | Self::Pk6(r) | Self::Pk7(r) | Self::Pb7(r) => r,
        }
    }

    /// Returns the generation of this entity.
    #[must_use]
    pub fn generation(&self) -> Generation {
        match self {
            Self::Pk4(_) => Generation::Four,
            Self::Pk5(_) => Generation::Five,
            Self::Pk6(_) => Generation::Six,
            Self::Pk7(_) => Generation::Seven,
            Self::Pb7(_) => Generation::Lgpe,
        }
    }

    /// Returns the encoded bytes.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        self.record().data()
    }

    /// Mutable access to the encoded bytes. The length cannot change.
    pub fn raw_mut(&mut self) -> &mut [u8] {
        &mut self.record_mut().data
    }

    /// Whether this is the team-member form.
    #[must_use]
    pub fn is_party(&self) -> bool {
        self.record().is_party()
    }

    /// The identity field. Zero marks an empty slot.
    #[must_use]
    pub fn species(&self) -> u16 {
        read_u16(self.raw(), SPECIES_OFFSET)
    }

    /// The creation seed.
    #[must_use]
    pub fn encryption_constant(&self) -> u32 {
        read_u32(self.raw(), ENCRYPTION_CONSTANT_OFFSET)
    }

    /// Whether the entity marks an empty slot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.species() == 0
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::empty()
    }
}

pub(crate) fn read_u16(data: &[u8], offset: usize) -> u16 {
    data.get(offset..offset + 2)
        .map_or(0, |b| u16::from_le_bytes([b[0], b[1]]))
}

pub(crate) fn read_u32(data: &[u8], offset: usize) -> u32 {
    data.get(offset..offset + 4)
        .map_or(0, |b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(generation: Generation, len: usize, species: u16) -> Vec<u8> {
        let mut data = vec![0x11; len];
        data[SPECIES_OFFSET..SPECIES_OFFSET + 2].copy_from_slice(&species.to_le_bytes());
        data
    }

    #[test]
    fn new_picks_form_from_length() {
        let boxed = Entity::new(Generation::Four, sample(Generation::Four, 136, 25)).unwrap();
        assert!(!boxed.is_party());
        let party = Entity::new(Generation::Four, sample(Generation::Four, 236, 25)).unwrap();
        assert!(party.is_party());
        assert_eq!(party.generation(), Generation::Four);
    }

    #[test]
    fn new_rejects_bad_length() {
        let result = Entity::new(Generation::Six, vec![0; 100]);
        assert!(matches!(result, Err(CoreError::InvalidEntity { .. })));
    }

    #[test]
    fn lgpe_is_never_party() {
        let entity = Entity::new(Generation::Lgpe, sample(Generation::Lgpe, 260, 133)).unwrap();
        assert!(!entity.is_party());
        let decoded = Entity::decode(Generation::Lgpe, &entity.encode());
        assert_eq!(decoded, entity);
    }

    #[test]
    fn empty_entity() {
        let empty = Entity::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.generation(), Generation::Seven);
        assert_eq!(empty.raw().len(), 232);
        assert_eq!(Entity::default(), empty);
    }

    #[test]
    fn encode_pads_with_sentinel() {
        let entity = Entity::new(Generation::Five, sample(Generation::Five, 136, 1)).unwrap();
        let payload = entity.encode();
        assert_eq!(&payload[..136], entity.raw());
        assert!(payload[136..].iter().all(|&b| b == SENTINEL));
    }

    #[test]
    fn decode_detects_party_region() {
        for generation in Generation::ALL {
            let party = Entity::new(generation, sample(generation, generation.party_len(), 7)).unwrap();
            let decoded = Entity::decode(generation, &party.encode());
            assert_eq!(decoded, party, "{generation}");

            let boxed = Entity::new(generation, sample(generation, generation.box_len(), 7)).unwrap();
            let decoded = Entity::decode(generation, &boxed.encode());
            assert_eq!(decoded, boxed, "{generation}");
        }
    }

    #[test]
    fn party_scan_sees_last_byte() {
        let mut payload = [SENTINEL; PAYLOAD_SIZE];
        payload[..232].fill(0);
        payload[PAYLOAD_SIZE - 1] = 0;
        assert!(Entity::decode(Generation::Six, &payload).is_party());
    }

    #[test]
    fn reencode_keeps_bytes() {
        let six = Entity::new(Generation::Six, sample(Generation::Six, 232, 150)).unwrap();
        let seven = six.reencode(Generation::Seven).unwrap();
        assert_eq!(seven.generation(), Generation::Seven);
        assert_eq!(seven.raw(), six.raw());
        assert!(six.reencode(Generation::Four).is_err());
    }

    #[test]
    fn field_readers() {
        let mut data = vec![0; 232];
        data[0..4].copy_from_slice(&0xDEAD_BEEF_u32.to_le_bytes());
        data[8..10].copy_from_slice(&721_u16.to_le_bytes());
        let entity = Entity::new(Generation::Six, data).unwrap();
        assert_eq!(entity.encryption_constant(), 0xDEAD_BEEF);
        assert_eq!(entity.species(), 721);
        assert_eq!(read_u16(&[1], 0), 0);
    }
}
