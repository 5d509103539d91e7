//! Bank facade: load, migrate, mutate and persist a bank.

use crate::backup;
use crate::change::ChangeDetector;
use crate::config::Config;
use crate::entity::{Entity, SpeciesData};
use crate::error::{CoreError, CoreResult};
use crate::format::{image_size, BankImage, SLOTS_PER_BOX};
use crate::layout::{
    BackendKind, BankPaths, Backends, LEGACY_BACKUP_PATH, LEGACY_BANK_PATH,
};
use crate::migration::{self, legacy_box_count};
use crate::names::BoxNames;
use crate::notify::{Notice, Notifier, NullNotifier};
use crate::selector::{self, LoadPlan, Probe};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Collaborators a bank reports to and consults.
#[derive(Clone)]
pub struct Hooks {
    /// Receives progress and warning notices.
    pub notifier: Arc<dyn Notifier>,
    /// Species reference data for legacy conversion.
    pub species: Option<Arc<dyn SpeciesData>>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self {
            notifier: Arc::new(NullNotifier),
            species: None,
        }
    }
}

impl Hooks {
    /// Sets the notifier.
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Sets the species data.
    #[must_use]
    pub fn species(mut self, species: Arc<dyn SpeciesData>) -> Self {
        self.species = Some(species);
        self
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("species", &self.species.is_some())
            .finish_non_exhaustive()
    }
}

/// A fixed-capacity store of entities, organised in boxes of 30 slots.
///
/// # Opening a Bank
///
/// ```rust
/// use pkbank_core::{Bank, Backends, Config, Hooks};
/// use pkbank_storage::InMemoryBackend;
///
/// let backends = Backends::new(InMemoryBackend::new(), InMemoryBackend::new());
/// let mut bank = Bank::open("main", Config::default(), backends, Hooks::default()).unwrap();
///
/// assert_eq!(bank.boxes(), 1);
/// assert!(bank.entity(0, 0).unwrap().is_empty());
/// assert!(!bank.is_dirty());
/// ```
///
/// All mutations happen in memory; nothing reaches storage until
/// [`save`](Bank::save), [`resize`](Bank::resize) or [`backup`](Bank::backup).
#[derive(Debug)]
pub struct Bank {
    name: String,
    paths: BankPaths,
    config: Config,
    backends: Backends,
    hooks: Hooks,
    image: BankImage,
    names: BoxNames,
    changes: ChangeDetector,
    names_dirty: bool,
}

impl Bank {
    /// Opens the bank called `name`, loading, converting or creating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the stored bank was written
    /// by an unsupported format version. Unreadable or corrupt banks are
    /// replaced by an empty one instead (a [`Notice::Corrupt`] is emitted).
    pub fn open(name: &str, config: Config, backends: Backends, hooks: Hooks) -> CoreResult<Self> {
        Self::open_with_backup(name, config, backends, hooks, None)
    }

    /// Like [`Bank::open`], with the backup-on-load decision overridden.
    ///
    /// `None` follows [`Config::auto_backup`].
    ///
    /// # Errors
    ///
    /// See [`Bank::open`].
    pub fn open_with_backup(
        name: &str,
        config: Config,
        backends: Backends,
        hooks: Hooks,
        backup: Option<bool>,
    ) -> CoreResult<Self> {
        let paths = BankPaths::new(name)?;
        let boxes = config.box_count.max(1);
        let mut bank = Self {
            name: name.to_string(),
            paths,
            config,
            backends,
            hooks,
            image: BankImage::create(boxes),
            names: BoxNames::with_defaults(boxes),
            changes: ChangeDetector::default(),
            names_dirty: false,
        };
        bank.reload(backup)?;
        Ok(bank)
    }

    /// Loads the bank again from storage, discarding unsaved changes.
    ///
    /// `backup_override` forces a backup on or off; `None` follows
    /// [`Config::auto_backup`].
    ///
    /// # Errors
    ///
    /// See [`Bank::open`].
    pub fn reload(&mut self, backup_override: Option<bool>) -> CoreResult<()> {
        self.changes = ChangeDetector::default();
        self.names_dirty = false;

        let probe = Probe::run(&self.name, &self.paths, &self.config, &self.backends);
        let mut plan = selector::select(&probe);
        info!(bank = %self.name, ?plan, "loading bank");

        if plan == LoadPlan::ConvertLegacy {
            if self.convert_legacy()? {
                return self.finish_load(backup_override);
            }
            plan = selector::select(&probe.without_legacy());
        }

        match plan {
            LoadPlan::Direct(kind) => {
                self.load_from(kind)?;
            }
            LoadPlan::Move { from, to } => {
                if !self.load_from(from)? {
                    warn!(bank = %self.name, %from, "source bank not loaded, leaving it in place");
                } else if self.save().is_ok() {
                    info!(bank = %self.name, %from, %to, "moved bank between backends");
                    self.delete_files(from);
                } else {
                    self.changes.forget_baseline();
                }
            }
            LoadPlan::ConvertLegacy => {}
        }

        self.finish_load(backup_override)
    }

    fn finish_load(&mut self, backup_override: Option<bool>) -> CoreResult<()> {
        if backup_override.unwrap_or(self.config.auto_backup) {
            if let Err(e) = self.backup() {
                warn!(bank = %self.name, error = %e, "backup on load failed");
            }
        }
        Ok(())
    }

    fn notify(&self, notice: Notice) {
        self.hooks.notifier.notify(notice);
    }

    fn fresh_boxes(&self) -> u32 {
        self.config.box_count.max(1)
    }

    /// Reads bank and names from one backend, then saves if anything had to
    /// be repaired or upgraded.
    ///
    /// Returns `false` if the stored bank could not be read or parsed and a
    /// fresh one was created in its place.
    fn load_from(&mut self, kind: BackendKind) -> CoreResult<bool> {
        let mut needs_save = false;
        let mut loaded = false;
        let backend = self.backends.get(kind);

        match backend.read(self.paths.bank()) {
            Ok(bytes) => {
                self.notify(Notice::Loading);
                match BankImage::parse(bytes) {
                    Ok(parsed) => {
                        self.image = parsed.image;
                        needs_save |= parsed.needs_save;
                        loaded = true;
                    }
                    Err(e) if !e.is_recoverable_on_load() => return Err(e),
                    Err(e) => {
                        warn!(bank = %self.name, backend = %kind, error = %e, "bank corrupt, creating a new one");
                        self.notify(Notice::Corrupt);
                        self.image = BankImage::create(self.fresh_boxes());
                        needs_save = true;
                    }
                }
            }
            Err(e) => {
                if !e.is_not_found() {
                    warn!(bank = %self.name, backend = %kind, error = %e, "bank unreadable, creating a new one");
                }
                self.notify(Notice::Creating);
                self.image = BankImage::create(self.fresh_boxes());
                needs_save = true;
            }
        }

        let backend = self.backends.get(kind);
        self.names = match backend.read(self.paths.names()) {
            Ok(data) => match BoxNames::from_json(&data) {
                Ok(names) => names,
                Err(e) => {
                    warn!(bank = %self.name, error = %e, "box names unreadable, using defaults");
                    needs_save = true;
                    BoxNames::default()
                }
            },
            Err(_) => {
                needs_save = true;
                BoxNames::default()
            }
        };
        needs_save |= self.names.extend_to(self.image.boxes());

        debug!(bank = %self.name, backend = %kind, boxes = self.image.boxes(), needs_save, "bank read");
        if needs_save {
            // A failed save is reported through the notifier; the bank stays usable.
            if self.save().is_err() {
                self.changes.forget_baseline();
            }
        } else {
            self.changes.mark_clean(self.image.as_bytes());
        }
        Ok(loaded)
    }

    /// Converts the pre-versioned monolithic bank.
    ///
    /// Returns `Ok(false)` if the legacy file could not be read; it is left in
    /// place and the normal load path runs instead.
    fn convert_legacy(&mut self) -> CoreResult<bool> {
        self.notify(Notice::Converting);

        let data = match self.backends.get(BackendKind::Removable).read(LEGACY_BANK_PATH) {
            Ok(data) => data,
            Err(e) => {
                error!(bank = %self.name, error = %e, "cannot read legacy bank");
                self.notify(Notice::ConvertFailed {
                    reason: e.to_string(),
                });
                return Ok(false);
            }
        };

        let boxes = legacy_box_count(data.len()).max(1);
        self.config.box_count = boxes;
        if let Err(e) = self.config.persist() {
            warn!(error = %e, "cannot persist converted box count");
        }

        let conversion = migration::convert(&data, boxes, self.hooks.species.as_deref())
            .map_err(|e| CoreError::migration_failed(e.to_string()))?;
        info!(bank = %self.name, report = ?conversion.report, "legacy bank converted");
        self.image = conversion.image;
        self.names = BoxNames::with_defaults(boxes);

        if let Err(e) = self.save() {
            warn!(error = %e, "keeping legacy bank until the converted bank is saved");
            self.changes.forget_baseline();
            return Ok(true);
        }

        let removable = self.backends.get_mut(BackendKind::Removable);
        match removable.write(LEGACY_BACKUP_PATH, &data) {
            Ok(()) => {
                if let Err(e) = removable.delete(LEGACY_BANK_PATH) {
                    warn!(error = %e, "cannot delete legacy bank");
                }
            }
            Err(e) => warn!(error = %e, "cannot back up legacy bank, keeping it"),
        }
        Ok(true)
    }

    fn delete_files(&mut self, kind: BackendKind) {
        let backend = self.backends.get_mut(kind);
        for path in [self.paths.bank(), self.paths.names()] {
            if let Err(e) = backend.delete(path) {
                warn!(backend = %kind, path, error = %e, "cannot delete stale bank file");
            }
        }
    }

    /// Writes the bank and its box names to the preferred backend.
    ///
    /// On failure the in-memory bank and the dirty state are unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be written.
    pub fn save(&mut self) -> CoreResult<()> {
        self.notify(Notice::Saving);
        let kind = BackendKind::preferred(&self.config);
        let backend = self.backends.get_mut(kind);

        if let Err(e) = backend.write(self.paths.bank(), self.image.as_bytes()) {
            error!(bank = %self.name, backend = %kind, error = %e, "bank save failed");
            self.hooks.notifier.notify(Notice::SaveFailed {
                reason: e.to_string(),
            });
            return Err(e.into());
        }

        let written = self
            .names
            .to_json()
            .and_then(|json| {
                backend
                    .write(self.paths.names(), &json)
                    .map_err(CoreError::from)
            });
        if let Err(e) = written {
            error!(bank = %self.name, backend = %kind, error = %e, "box names save failed");
            self.hooks.notifier.notify(Notice::NamesSaveFailed {
                reason: e.to_string(),
            });
            return Err(e);
        }

        self.changes.mark_clean(self.image.as_bytes());
        self.names_dirty = false;
        info!(bank = %self.name, backend = %kind, boxes = self.image.boxes(), "bank saved");
        Ok(())
    }

    /// Writes a backup snapshot of the in-memory bank to removable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub fn backup(&mut self) -> CoreResult<()> {
        self.notify(Notice::BackingUp);
        backup::write_backup(
            self.backends.get_mut(BackendKind::Removable),
            &self.paths,
            &self.image,
            &self.names,
        )
    }

    /// Changes the number of boxes and saves immediately.
    ///
    /// Entries beyond the new capacity are lost; new boxes are empty. Stale
    /// files in both backends are removed before the resized bank is written.
    /// If that write fails the previous bank is kept in memory and reported
    /// as dirty.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` for zero boxes, or the save error.
    pub fn resize(&mut self, boxes: u32) -> CoreResult<()> {
        if boxes == 0 {
            return Err(CoreError::invalid_operation("a bank needs at least one box"));
        }
        if image_size(boxes) == self.image.as_bytes().len() {
            return Ok(());
        }

        self.notify(Notice::Resizing);
        info!(bank = %self.name, from = self.image.boxes(), to = boxes, "resizing bank");
        let resized = self.image.resized(boxes);
        let previous = std::mem::replace(&mut self.image, resized);
        let previous_names = self.names.clone();
        self.names.extend_to(boxes);

        for kind in BackendKind::ALL {
            self.delete_files(kind);
        }

        if let Err(e) = self.save() {
            self.image = previous;
            self.names = previous_names;
            self.changes.forget_baseline();
            return Err(e);
        }

        self.config.box_count = boxes;
        if let Err(e) = self.config.persist() {
            warn!(error = %e, "cannot persist resized box count");
        }
        Ok(())
    }

    fn index(&self, box_index: u32, slot: u32) -> CoreResult<usize> {
        let boxes = self.image.boxes();
        if box_index >= boxes || slot >= SLOTS_PER_BOX {
            return Err(CoreError::SlotOutOfRange {
                box_index,
                slot,
                boxes,
            });
        }
        Ok((box_index * SLOTS_PER_BOX + slot) as usize)
    }

    /// Returns a copy of the entity at `box_index`/`slot`.
    ///
    /// # Errors
    ///
    /// Returns `SlotOutOfRange` if the slot is outside the bank.
    pub fn entity(&self, box_index: u32, slot: u32) -> CoreResult<Entity> {
        let index = self.index(box_index, slot)?;
        self.image
            .entity(index)
            .ok_or_else(|| CoreError::invalid_operation("entry missing from image"))
    }

    /// Stores `entity` at `box_index`/`slot`.
    ///
    /// An entity with species 0 (the empty marker) empties the slot.
    ///
    /// # Errors
    ///
    /// Returns `SlotOutOfRange` if the slot is outside the bank.
    pub fn set_entity(&mut self, box_index: u32, slot: u32, entity: &Entity) -> CoreResult<()> {
        let index = self.index(box_index, slot)?;
        self.image.set_entity(index, entity);
        self.changes.mark_dirty();
        Ok(())
    }

    /// Returns the name of `box_index`.
    ///
    /// # Errors
    ///
    /// Returns `BoxOutOfRange` if the box is outside the bank.
    pub fn box_name(&self, box_index: u32) -> CoreResult<&str> {
        self.check_box(box_index)?;
        self.names
            .get(box_index)
            .ok_or_else(|| CoreError::invalid_operation("box name missing"))
    }

    /// Renames `box_index`.
    ///
    /// # Errors
    ///
    /// Returns `BoxOutOfRange` if the box is outside the bank.
    pub fn set_box_name(&mut self, box_index: u32, name: impl Into<String>) -> CoreResult<()> {
        self.check_box(box_index)?;
        if self.names.set(box_index, name) {
            self.names_dirty = true;
        }
        Ok(())
    }

    fn check_box(&self, box_index: u32) -> CoreResult<()> {
        let boxes = self.image.boxes();
        if box_index >= boxes {
            return Err(CoreError::BoxOutOfRange { box_index, boxes });
        }
        Ok(())
    }

    /// Whether the bank differs from what was last loaded or saved.
    ///
    /// No-op mutations (writing back identical bytes) are detected and do
    /// not count.
    pub fn is_dirty(&mut self) -> bool {
        self.names_dirty || self.changes.has_changed(self.image.as_bytes())
    }

    /// Returns the bank name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of boxes.
    #[must_use]
    pub fn boxes(&self) -> u32 {
        self.image.boxes()
    }

    /// Returns the box names.
    #[must_use]
    pub fn box_names(&self) -> &BoxNames {
        &self.names
    }

    /// Returns the number of slots holding an entity.
    #[must_use]
    pub fn occupied_slots(&self) -> usize {
        (0..self.image.entry_count())
            .filter(|&i| self.image.is_occupied(i))
            .count()
    }

    /// Returns the serialized bank as it would be saved.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_bytes()
    }

    /// Returns the object paths of this bank.
    #[must_use]
    pub fn paths(&self) -> &BankPaths {
        &self.paths
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the configuration mutably.
    ///
    /// Changing the backend preference takes effect on the next save.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Generation;
    use pkbank_storage::{InMemoryBackend, StorageBackend};

    struct Fixture {
        removable: InMemoryBackend,
        archive: InMemoryBackend,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                removable: InMemoryBackend::new(),
                archive: InMemoryBackend::new(),
            }
        }

        fn open(&self, name: &str, config: Config) -> Bank {
            let backends = Backends::new(self.removable.clone(), self.archive.clone());
            Bank::open(name, config, backends, Hooks::default()).unwrap()
        }
    }

    fn pikachu() -> Entity {
        let mut data = vec![0x5A; 232];
        data[8..10].copy_from_slice(&25u16.to_le_bytes());
        Entity::new(Generation::Seven, data).unwrap()
    }

    #[test]
    fn fresh_bank_is_created_and_saved() {
        let fx = Fixture::new();
        let mut bank = fx.open("main", Config::default().auto_backup(false));

        assert_eq!(bank.boxes(), 1);
        assert_eq!(bank.as_bytes().len(), image_size(1));
        assert!(!bank.is_dirty());
        assert!(fx.archive.exists("banks/main.bnk"));
        assert!(fx.archive.exists("banks/main.json"));
        assert!(fx.removable.paths().is_empty());
    }

    #[test]
    fn set_get_and_dirty() {
        let fx = Fixture::new();
        let mut bank = fx.open("main", Config::default().auto_backup(false));

        bank.set_entity(0, 3, &pikachu()).unwrap();
        assert!(bank.is_dirty());
        assert_eq!(bank.entity(0, 3).unwrap(), pikachu());
        assert_eq!(bank.occupied_slots(), 1);

        bank.save().unwrap();
        assert!(!bank.is_dirty());

        bank.set_entity(0, 3, &pikachu()).unwrap();
        assert!(!bank.is_dirty());
    }

    #[test]
    fn out_of_range_addresses() {
        let fx = Fixture::new();
        let mut bank = fx.open("main", Config::default().auto_backup(false));

        assert!(matches!(
            bank.entity(1, 0),
            Err(CoreError::SlotOutOfRange { .. })
        ));
        assert!(matches!(
            bank.set_entity(0, 30, &pikachu()),
            Err(CoreError::SlotOutOfRange { .. })
        ));
        assert!(matches!(
            bank.set_box_name(1, "x"),
            Err(CoreError::BoxOutOfRange { .. })
        ));
        assert!(!bank.is_dirty());
    }

    #[test]
    fn renaming_marks_dirty_until_saved() {
        let fx = Fixture::new();
        let mut bank = fx.open("main", Config::default().auto_backup(false));

        bank.set_box_name(0, "Shinies").unwrap();
        assert!(bank.is_dirty());
        assert_eq!(bank.box_name(0).unwrap(), "Shinies");
        bank.save().unwrap();
        assert!(!bank.is_dirty());

        let bank = fx.open("main", Config::default().auto_backup(false));
        assert_eq!(bank.box_name(0).unwrap(), "Shinies");
    }

    #[test]
    fn failed_save_keeps_dirty_state() {
        let fx = Fixture::new();
        let mut bank = fx.open("main", Config::default().auto_backup(false));
        bank.set_entity(0, 0, &pikachu()).unwrap();

        fx.archive.fail_writes(true);
        assert!(bank.save().is_err());
        assert!(bank.is_dirty());
        assert_eq!(bank.entity(0, 0).unwrap(), pikachu());

        fx.archive.fail_writes(false);
        bank.save().unwrap();
        assert!(!bank.is_dirty());
    }

    #[test]
    fn resize_to_zero_rejected() {
        let fx = Fixture::new();
        let mut bank = fx.open("main", Config::default().auto_backup(false));
        assert!(matches!(
            bank.resize(0),
            Err(CoreError::InvalidOperation { .. })
        ));
    }

    #[test]
    fn auto_backup_on_load() {
        let fx = Fixture::new();
        let _bank = fx.open("main", Config::default());
        assert!(fx.removable.exists("banks/main.bnk.bak"));
        assert!(fx.removable.exists("banks/main.json.bak"));
    }

    #[test]
    fn reload_discards_unsaved_changes() {
        let fx = Fixture::new();
        let mut bank = fx.open("main", Config::default().auto_backup(false));
        bank.set_entity(0, 0, &pikachu()).unwrap();

        bank.reload(Some(false)).unwrap();
        assert!(bank.entity(0, 0).unwrap().is_empty());
        assert!(!bank.is_dirty());
    }

    #[test]
    fn invalid_name_rejected() {
        let fx = Fixture::new();
        let backends = Backends::new(fx.removable.clone(), fx.archive.clone());
        let result = Bank::open("../evil", Config::default(), backends, Hooks::default());
        assert!(result.is_err());
    }

    #[test]
    fn unsupported_version_aborts_open() {
        let fx = Fixture::new();
        let mut bytes = BankImage::create(1).into_bytes();
        bytes[8..12].copy_from_slice(&3u32.to_le_bytes());
        let mut archive = fx.archive.clone();
        archive.write("banks/main.bnk", &bytes).unwrap();

        let backends = Backends::new(fx.removable.clone(), fx.archive.clone());
        let result = Bank::open("main", Config::default(), backends, Hooks::default());
        assert!(matches!(
            result,
            Err(CoreError::UnsupportedVersion { version: 3 })
        ));
        assert_eq!(fx.archive.read("banks/main.bnk").unwrap(), bytes);
    }
}
