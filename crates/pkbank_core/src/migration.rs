//! Conversion of the pre-versioned monolithic bank.
//!
//! The oldest bank was a headerless array of 232-byte records, 30 per box,
//! with no generation tag. Every record was written as Gen 6, but Gen 7
//! records share the same size and were stored there too. Conversion decodes
//! each record as Gen 6 and re-tags it as Gen 7 when its contents cannot be
//! a valid Gen 6 record.
//!
//! This is a one-way, best-effort reclassification. The raw legacy bytes are
//! kept in a backup file by the caller.

use crate::entity::{read_u16, read_u32, Entity, Generation, SpeciesData, MAX_LEVEL};
use crate::error::CoreResult;
use crate::format::{BankImage, SLOTS_PER_BOX};
use tracing::debug;

/// Size of one record in the legacy file.
pub const LEGACY_RECORD_SIZE: usize = 232;

const LEGACY_BOX_SIZE: usize = LEGACY_RECORD_SIZE * SLOTS_PER_BOX as usize;

// Highest identifiers known to the Gen 6 games.
const MAX_MOVE: u16 = 621;
const MAX_GAME: u8 = 27;
const MAX_SPECIES: u16 = 721;
const MAX_ABILITY: u8 = 191;
const MAX_HELD_ITEM: u16 = 775;

const MAX_GEN4_ENCOUNTER_TYPE: u8 = 24;
const GEN4_GAMES: [u8; 5] = [7, 8, 10, 11, 12];

const HELD_ITEM_OFFSET: usize = 0x0A;
const EXPERIENCE_OFFSET: usize = 0x10;
const ABILITY_OFFSET: usize = 0x14;
const MOVES_OFFSET: usize = 0x5A;
const RELEARN_MOVES_OFFSET: usize = 0x6A;
const ENCOUNTER_TYPE_OFFSET: usize = 0xDE;
const GAME_OFFSET: usize = 0xDF;

/// Gen 6 field view over one legacy record.
#[derive(Debug, Clone, Copy)]
pub struct LegacyRecord<'a> {
    data: &'a [u8],
}

impl<'a> LegacyRecord<'a> {
    /// Wraps a 232-byte record.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Creation seed.
    #[must_use]
    pub fn encryption_constant(&self) -> u32 {
        read_u32(self.data, 0x00)
    }

    /// Species identifier.
    #[must_use]
    pub fn species(&self) -> u16 {
        read_u16(self.data, 0x08)
    }

    /// Held item identifier.
    #[must_use]
    pub fn held_item(&self) -> u16 {
        read_u16(self.data, HELD_ITEM_OFFSET)
    }

    /// Experience points.
    #[must_use]
    pub fn experience(&self) -> u32 {
        read_u32(self.data, EXPERIENCE_OFFSET)
    }

    /// Ability identifier.
    #[must_use]
    pub fn ability(&self) -> u8 {
        self.byte(ABILITY_OFFSET)
    }

    /// The four current moves.
    #[must_use]
    pub fn moves(&self) -> [u16; 4] {
        self.move_block(MOVES_OFFSET)
    }

    /// The four relearnable moves.
    #[must_use]
    pub fn relearn_moves(&self) -> [u16; 4] {
        self.move_block(RELEARN_MOVES_OFFSET)
    }

    /// Gen 4 encounter type.
    #[must_use]
    pub fn encounter_type(&self) -> u8 {
        self.byte(ENCOUNTER_TYPE_OFFSET)
    }

    /// Game of origin.
    #[must_use]
    pub fn origin_game(&self) -> u8 {
        self.byte(GAME_OFFSET)
    }

    /// Whether the record originates from a Gen 4 game.
    #[must_use]
    pub fn from_gen4(&self) -> bool {
        GEN4_GAMES.contains(&self.origin_game())
    }

    fn byte(&self, offset: usize) -> u8 {
        self.data.get(offset).copied().unwrap_or(0)
    }

    fn move_block(&self, offset: usize) -> [u16; 4] {
        std::array::from_fn(|i| read_u16(self.data, offset + 2 * i))
    }
}

/// Why a record was re-tagged as Gen 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// A current move is unknown to Gen 6.
    Move,
    /// A relearnable move is unknown to Gen 6.
    RelearnMove,
    /// The origin game is newer than Gen 6.
    Game,
    /// The species is newer than Gen 6.
    Species,
    /// The ability is newer than Gen 6.
    Ability,
    /// The held item is newer than Gen 6.
    HeldItem,
    /// Level 100 with an encounter type only hyper training explains.
    HyperTrained,
}

/// How a legacy record is carried over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing stored in the slot.
    Empty,
    /// Stored as Gen 6.
    Gen6,
    /// Stored as Gen 7.
    Gen7(Reason),
}

/// Decides which encoding a legacy record belongs to.
///
/// Without species data the level cannot be derived and the hyper-training
/// rule never fires.
#[must_use]
pub fn classify(record: &LegacyRecord<'_>, species: Option<&dyn SpeciesData>) -> Verdict {
    if record.encryption_constant() == 0 && record.species() == 0 {
        return Verdict::Empty;
    }

    let reason = if record.moves().iter().any(|&m| m > MAX_MOVE) {
        Some(Reason::Move)
    } else if record.relearn_moves().iter().any(|&m| m > MAX_MOVE) {
        Some(Reason::RelearnMove)
    } else if record.origin_game() > MAX_GAME {
        Some(Reason::Game)
    } else if record.species() > MAX_SPECIES {
        Some(Reason::Species)
    } else if record.ability() > MAX_ABILITY {
        Some(Reason::Ability)
    } else if record.held_item() > MAX_HELD_ITEM {
        Some(Reason::HeldItem)
    } else if record.encounter_type() != 0 {
        let level = species.and_then(|s| s.level(record.species(), record.experience()));
        let impossible_encounter =
            !record.from_gen4() || record.encounter_type() > MAX_GEN4_ENCOUNTER_TYPE;
        (level == Some(MAX_LEVEL) && impossible_encounter).then_some(Reason::HyperTrained)
    } else {
        None
    };

    reason.map_or(Verdict::Gen6, Verdict::Gen7)
}

/// Number of whole boxes in a legacy file of `len` bytes.
#[must_use]
pub fn legacy_box_count(len: usize) -> u32 {
    u32::try_from(len / LEGACY_BOX_SIZE).unwrap_or(u32::MAX)
}

/// Counts of what a conversion did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// Boxes in the converted bank.
    pub boxes: u32,
    /// Records carried over as empty slots.
    pub empty: usize,
    /// Records kept as Gen 6.
    pub gen6: usize,
    /// Records re-tagged as Gen 7.
    pub gen7: usize,
}

/// Output of a legacy conversion.
#[derive(Debug)]
pub struct LegacyConversion {
    /// The converted bank.
    pub image: BankImage,
    /// What happened to the records.
    pub report: ConversionReport,
}

/// Converts legacy bytes into a current bank of `boxes` boxes.
///
/// Records beyond `boxes` (or beyond the whole boxes in `data`) are not
/// carried over.
///
/// # Errors
///
/// Returns an error if a record cannot be re-encoded.
pub fn convert(
    data: &[u8],
    boxes: u32,
    species: Option<&dyn SpeciesData>,
) -> CoreResult<LegacyConversion> {
    let mut image = BankImage::create(boxes);
    let mut report = ConversionReport {
        boxes,
        ..ConversionReport::default()
    };

    let copied = legacy_box_count(data.len()).min(boxes) as usize;
    let records = data[..copied * LEGACY_BOX_SIZE].chunks_exact(LEGACY_RECORD_SIZE);

    for (index, raw) in records.enumerate() {
        let entity = Entity::new(Generation::Six, raw.to_vec())?;
        let verdict = classify(&LegacyRecord::new(raw), species);
        let entity = match verdict {
            Verdict::Empty => {
                report.empty += 1;
                entity
            }
            Verdict::Gen6 => {
                report.gen6 += 1;
                entity
            }
            Verdict::Gen7(reason) => {
                debug!(index, ?reason, "legacy record re-tagged as gen7");
                report.gen7 += 1;
                entity.reencode(Generation::Seven)?
            }
        };
        image.set_entity(index, &entity);
    }

    Ok(LegacyConversion { image, report })
}
