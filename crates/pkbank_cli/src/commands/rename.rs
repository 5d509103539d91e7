//! Rename command.

use super::Context;

/// Renames one box of a bank and saves.
pub fn run(
    ctx: &Context,
    name: &str,
    box_index: u32,
    title: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut bank = ctx.open(name, false)?;
    let old = bank.box_name(box_index)?.to_string();
    bank.set_box_name(box_index, title)?;

    if bank.is_dirty() {
        bank.save()?;
        println!("✓ Box {box_index} renamed: {old:?} -> {title:?}");
    } else {
        println!("Box {box_index} is already named {title:?}");
    }

    Ok(())
}
