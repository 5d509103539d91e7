//! Test fixtures and bank helpers.
//!
//! Provides backends that outlive the banks opened on them, builders for
//! entities and legacy files, and collaborators that record what the engine
//! tells them.

use parking_lot::Mutex;
use pkbank_core::format::{BANK_MAGIC, ENTRY_SIZE, LEGACY_BANK_VERSION, SLOTS_PER_BOX};
use pkbank_core::migration::LEGACY_RECORD_SIZE;
use pkbank_core::{
    Backends, Bank, Config, CoreResult, Entity, Generation, GrowthRate, Hooks, Notice, Notifier,
    SpeciesData,
};
use pkbank_storage::{FileBackend, InMemoryBackend};
use std::collections::BTreeMap;
use std::sync::Arc;
use tempfile::TempDir;

/// Storage roots shared by every bank opened from this fixture.
///
/// In-memory handles are clones of the backends handed to the bank, so tests
/// can inspect or corrupt storage while a bank is open.
pub struct TestStorage {
    /// Removable storage.
    pub removable: InMemoryBackend,
    /// Archive storage.
    pub archive: InMemoryBackend,
    /// Notices received by banks opened through [`TestStorage::open`].
    pub notices: Arc<RecordingNotifier>,
    species: Option<Arc<dyn SpeciesData>>,
}

impl Default for TestStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStorage {
    /// Creates empty in-memory storage.
    pub fn new() -> Self {
        Self {
            removable: InMemoryBackend::new(),
            archive: InMemoryBackend::new(),
            notices: Arc::new(RecordingNotifier::default()),
            species: None,
        }
    }

    /// Uses `species` for legacy conversion.
    #[must_use]
    pub fn with_species(mut self, species: impl SpeciesData + 'static) -> Self {
        self.species = Some(Arc::new(species));
        self
    }

    /// Backends backed by this storage.
    pub fn backends(&self) -> Backends {
        Backends::new(self.removable.clone(), self.archive.clone())
    }

    /// Hooks that record notices here.
    pub fn hooks(&self) -> Hooks {
        let hooks = Hooks::default().notifier(self.notices.clone());
        match &self.species {
            Some(species) => hooks.species(species.clone()),
            None => hooks,
        }
    }

    /// Opens `name` with `config`.
    pub fn try_open(&self, name: &str, config: Config) -> CoreResult<Bank> {
        Bank::open(name, config, self.backends(), self.hooks())
    }

    /// Opens `name` with `config`, panicking on error.
    pub fn open(&self, name: &str, config: Config) -> Bank {
        self.try_open(name, config).expect("Failed to open bank")
    }
}

/// Storage rooted in temporary directories.
pub struct TempStorage {
    /// Removable storage root.
    pub removable: TempDir,
    /// Archive storage root.
    pub archive: TempDir,
}

impl TempStorage {
    /// Creates two fresh temporary roots.
    pub fn new() -> Self {
        Self {
            removable: TempDir::new().expect("Failed to create temp directory"),
            archive: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// File backends over the two roots.
    pub fn backends(&self) -> Backends {
        Backends::new(
            FileBackend::new(self.removable.path()),
            FileBackend::new(self.archive.path()),
        )
    }

    /// Opens `name` with `config`, panicking on error.
    pub fn open(&self, name: &str, config: Config) -> Bank {
        Bank::open(name, config, self.backends(), Hooks::default()).expect("Failed to open bank")
    }
}

impl Default for TempStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration that never writes backups on load.
pub fn quiet_config() -> Config {
    Config::default().auto_backup(false)
}

/// Records every notice it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Returns the notices received so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// Whether `notice` has been received.
    pub fn saw(&self, notice: &Notice) -> bool {
        self.notices.lock().contains(notice)
    }

    /// Whether any problem notice has been received.
    pub fn saw_problem(&self) -> bool {
        self.notices.lock().iter().any(Notice::is_problem)
    }

    /// Forgets all notices.
    pub fn clear(&self) {
        self.notices.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}

/// Species data from an explicit table.
#[derive(Debug, Clone, Default)]
pub struct SpeciesTable {
    rates: BTreeMap<u16, GrowthRate>,
}

impl SpeciesTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a species.
    #[must_use]
    pub fn with(mut self, species: u16, rate: GrowthRate) -> Self {
        self.rates.insert(species, rate);
        self
    }
}

impl SpeciesData for SpeciesTable {
    fn growth_rate(&self, species: u16) -> Option<GrowthRate> {
        self.rates.get(&species).copied()
    }
}

/// Builds entity bytes for a generation.
#[derive(Debug, Clone)]
pub struct EntityBuilder {
    generation: Generation,
    data: Vec<u8>,
}

impl EntityBuilder {
    /// Box-form entity of `generation` filled with a recognisable pattern.
    pub fn new(generation: Generation) -> Self {
        let data = (0..generation.box_len()).map(|i| (i % 251) as u8).collect();
        Self { generation, data }.encryption_constant(0x1234_5678)
    }

    /// Team-member form; falls back to box form for generations without one.
    #[must_use]
    pub fn party(mut self) -> Self {
        let len = self.generation.party_len();
        self.data.resize(len, 0x33);
        self
    }

    /// Sets the identity field.
    #[must_use]
    pub fn encryption_constant(mut self, value: u32) -> Self {
        self.data[0..4].copy_from_slice(&value.to_le_bytes());
        self
    }

    /// Sets the species number.
    #[must_use]
    pub fn species(mut self, value: u16) -> Self {
        self.data[8..10].copy_from_slice(&value.to_le_bytes());
        self
    }

    /// Builds the entity.
    pub fn build(self) -> Entity {
        Entity::new(self.generation, self.data).expect("Builder produced an invalid entity")
    }
}

/// A Gen 7 entity of `species`, distinguishable by `seed`.
pub fn sample_entity(species: u16, seed: u32) -> Entity {
    EntityBuilder::new(Generation::Seven)
        .species(species)
        .encryption_constant(seed.max(1))
        .build()
}

/// Builds a version 1 bank: 12-byte header, no box count.
pub fn v1_bank(boxes: usize, fill: u8) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&BANK_MAGIC);
    bytes.extend_from_slice(&LEGACY_BANK_VERSION.to_le_bytes());
    bytes.resize(bytes.len() + boxes * SLOTS_PER_BOX as usize * ENTRY_SIZE, fill);
    bytes
}

/// Builds the pre-versioned monolithic bank file.
#[derive(Debug, Clone)]
pub struct LegacyBankBuilder {
    data: Vec<u8>,
}

impl LegacyBankBuilder {
    /// `boxes` boxes of empty (all-zero) records.
    pub fn new(boxes: usize) -> Self {
        Self {
            data: vec![0; boxes * SLOTS_PER_BOX as usize * LEGACY_RECORD_SIZE],
        }
    }

    /// Edits record `index` in place.
    #[must_use]
    pub fn record(mut self, index: usize, edit: impl FnOnce(&mut LegacyRecordBuilder<'_>)) -> Self {
        let start = index * LEGACY_RECORD_SIZE;
        let mut record = LegacyRecordBuilder {
            data: &mut self.data[start..start + LEGACY_RECORD_SIZE],
        };
        edit(&mut record);
        self
    }

    /// Appends bytes that do not form a whole box.
    #[must_use]
    pub fn trailing(mut self, len: usize) -> Self {
        self.data.resize(self.data.len() + len, 0x77);
        self
    }

    /// Returns the file contents.
    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// Field setters for one legacy record.
pub struct LegacyRecordBuilder<'a> {
    data: &'a mut [u8],
}

impl LegacyRecordBuilder<'_> {
    fn put_u16(&mut self, offset: usize, value: u16) {
        self.data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    /// A plausible Gen 6 record: nonzero identity, in-range fields.
    pub fn plausible(&mut self) -> &mut Self {
        self.data[0..4].copy_from_slice(&0xCAFE_F00Du32.to_le_bytes());
        self.species(150).item(1).ability(46).moves([94, 105, 0, 0]).game(24)
    }

    /// Sets the species number.
    pub fn species(&mut self, value: u16) -> &mut Self {
        self.put_u16(0x08, value);
        self
    }

    /// Sets the held item.
    pub fn item(&mut self, value: u16) -> &mut Self {
        self.put_u16(0x0A, value);
        self
    }

    /// Sets the experience points.
    pub fn experience(&mut self, value: u32) -> &mut Self {
        self.data[0x10..0x14].copy_from_slice(&value.to_le_bytes());
        self
    }

    /// Sets the ability.
    pub fn ability(&mut self, value: u8) -> &mut Self {
        self.data[0x14] = value;
        self
    }

    /// Sets the four current moves.
    pub fn moves(&mut self, moves: [u16; 4]) -> &mut Self {
        for (i, m) in moves.into_iter().enumerate() {
            self.put_u16(0x5A + i * 2, m);
        }
        self
    }

    /// Sets the four relearnable moves.
    pub fn relearn(&mut self, moves: [u16; 4]) -> &mut Self {
        for (i, m) in moves.into_iter().enumerate() {
            self.put_u16(0x6A + i * 2, m);
        }
        self
    }

    /// Sets the encounter type.
    pub fn encounter_type(&mut self, value: u8) -> &mut Self {
        self.data[0xDE] = value;
        self
    }

    /// Sets the origin game.
    pub fn game(&mut self, value: u8) -> &mut Self {
        self.data[0xDF] = value;
        self
    }
}
