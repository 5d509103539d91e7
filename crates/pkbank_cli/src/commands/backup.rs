//! Backup command.

use super::Context;
use tracing::info;

/// Writes a backup snapshot of the bank to removable storage.
pub fn run(ctx: &Context, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("Backing up bank {name:?}");

    let mut bank = ctx.open(name, false)?;
    bank.backup()?;

    let paths = bank.paths();
    println!("✓ Backup created successfully");
    println!("  Bank:  {}", paths.bank_backup());
    println!("  Names: {}", paths.names_backup());
    println!("  Boxes: {}", bank.boxes());
    println!("  Occupied slots: {}", bank.occupied_slots());

    Ok(())
}
