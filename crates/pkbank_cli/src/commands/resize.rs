//! Resize command.

use super::Context;
use tracing::info;

/// Changes the box count of a bank.
///
/// The box count is also written to the configuration file so newly created
/// banks match.
pub fn run(ctx: &Context, name: &str, boxes: u32) -> Result<(), Box<dyn std::error::Error>> {
    let mut bank = ctx.open(name, true)?;
    let before = bank.boxes();
    let occupied = bank.occupied_slots();

    info!("Resizing bank {name:?} from {before} to {boxes} boxes");
    bank.resize(boxes)?;

    let lost = occupied.saturating_sub(bank.occupied_slots());
    println!("✓ Bank resized");
    println!("  Boxes: {before} -> {}", bank.boxes());
    if lost > 0 {
        println!("  Entries dropped: {lost} (a backup was written before resizing)");
    }

    Ok(())
}
