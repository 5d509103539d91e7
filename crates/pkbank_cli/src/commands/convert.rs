//! Legacy conversion command.

use super::Context;
use pkbank_core::layout::{BackendKind, LEGACY_BANK_NAME, LEGACY_BANK_PATH, LEGACY_BACKUP_PATH};
use pkbank_core::migration::{self, legacy_box_count};
use tracing::info;

/// Converts the legacy bank, or reports what conversion would do.
pub fn run(ctx: &Context, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let backends = ctx.backends();
    let removable = backends.get(BackendKind::Removable);
    if !removable.exists(LEGACY_BANK_PATH) {
        return Err(format!("No legacy bank found at {LEGACY_BANK_PATH}").into());
    }

    let data = removable.read(LEGACY_BANK_PATH)?;
    let boxes = legacy_box_count(data.len()).max(1);
    let species = ctx.species()?;
    let report = migration::convert(&data, boxes, species.as_deref())?.report;

    println!("Legacy bank: {} bytes, {boxes} boxes", data.len());
    if species.is_none() {
        println!("  (no species table; level-100 hyper-training is not detected)");
    }
    println!("  Empty:     {}", report.empty);
    println!("  Gen 6:     {}", report.gen6);
    println!("  Gen 7:     {}", report.gen7);

    if dry_run {
        println!();
        println!("Dry run - no changes made");
        return Ok(());
    }

    info!("Converting legacy bank into {LEGACY_BANK_NAME:?}");
    let bank = ctx.open(LEGACY_BANK_NAME, true)?;
    println!();
    println!("✓ Converted into bank {:?} ({} boxes)", bank.name(), bank.boxes());
    if backends.get(BackendKind::Removable).exists(LEGACY_BACKUP_PATH) {
        println!("  Original kept at {LEGACY_BACKUP_PATH}");
    }

    Ok(())
}
