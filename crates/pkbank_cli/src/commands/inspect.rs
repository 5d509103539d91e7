//! Inspect command implementation.
//!
//! Reads bank files directly; nothing is migrated or written.

use super::Context;
use pkbank_core::format::BankImage;
use pkbank_core::layout::BackendKind;
use pkbank_core::selector::{self, LoadPlan, Probe};
use pkbank_core::{BankPaths, BoxNames, Generation, SLOTS_PER_BOX};
use serde::Serialize;
use std::collections::BTreeMap;

/// Bank inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Bank name.
    pub name: String,
    /// Backend the bank was read from.
    pub backend: String,
    /// File size in bytes.
    pub size: usize,
    /// Format version after any in-memory upgrade.
    pub version: u32,
    /// Number of boxes.
    pub boxes: u32,
    /// Whether loading would rewrite the file.
    pub needs_save: bool,
    /// Occupied slots per generation.
    pub occupied: BTreeMap<String, usize>,
    /// Per-box details.
    pub box_details: Vec<BoxSummary>,
    /// Occupied slots (if requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<SlotSummary>>,
}

/// One box.
#[derive(Debug, Serialize)]
pub struct BoxSummary {
    /// Box index.
    pub index: u32,
    /// Box name.
    pub name: String,
    /// Occupied slots.
    pub occupied: usize,
}

/// One occupied slot.
#[derive(Debug, Serialize)]
pub struct SlotSummary {
    /// Box index.
    pub box_index: u32,
    /// Slot within the box.
    pub slot: u32,
    /// Stored generation.
    pub generation: String,
    /// Species number.
    pub species: u16,
}

/// Runs the inspect command.
pub fn run(
    ctx: &Context,
    name: &str,
    show_slots: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let paths = BankPaths::new(name)?;
    let backends = ctx.backends();
    let probe = Probe::run(name, &paths, &ctx.config()?, &backends);

    let kind = source_backend(&probe).ok_or_else(|| {
        format!("Bank {name:?} is still a legacy bank; run `pkbank convert --dry-run`")
    })?;
    if !backends.get(kind).exists(paths.bank()) {
        return Err(format!("No bank named {name:?} found").into());
    }
    let bytes = backends.get(kind).read(paths.bank())?;

    let size = bytes.len();
    let parsed = BankImage::parse(bytes)?;
    let image = parsed.image;
    let names = backends
        .get(kind)
        .read(paths.names())
        .ok()
        .and_then(|data| BoxNames::from_json(&data).ok())
        .map(|mut names| {
            names.extend_to(image.boxes());
            names
        })
        .unwrap_or_else(|| BoxNames::with_defaults(image.boxes()));

    let mut occupied = BTreeMap::new();
    let mut box_details = Vec::new();
    let mut slots = Vec::new();

    for box_index in 0..image.boxes() {
        let mut in_box = 0;
        for slot in 0..SLOTS_PER_BOX {
            let index = (box_index * SLOTS_PER_BOX + slot) as usize;
            let Some(entity) = image.entity(index).filter(|e| !e.is_empty()) else {
                continue;
            };
            in_box += 1;
            *occupied.entry(entity.generation().to_string()).or_insert(0) += 1;
            if show_slots {
                slots.push(SlotSummary {
                    box_index,
                    slot,
                    generation: entity.generation().to_string(),
                    species: entity.species(),
                });
            }
        }
        box_details.push(BoxSummary {
            index: box_index,
            name: names.get(box_index).unwrap_or_default().to_string(),
            occupied: in_box,
        });
    }

    let result = InspectResult {
        name: name.to_string(),
        backend: kind.to_string(),
        size,
        version: image.header().version,
        boxes: image.boxes(),
        needs_save: parsed.needs_save,
        occupied,
        box_details,
        slots: show_slots.then_some(slots),
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// The backend `Bank::open` would read from, or `None` if it would convert
/// the legacy bank instead.
fn source_backend(probe: &Probe) -> Option<BackendKind> {
    match selector::select(probe) {
        LoadPlan::Direct(kind) => Some(kind),
        LoadPlan::Move { from, .. } => Some(from),
        LoadPlan::ConvertLegacy => None,
    }
}

fn print_text_output(result: &InspectResult) {
    println!("Bank Inspection");
    println!("===============");
    println!();
    println!("Name:    {}", result.name);
    println!("Backend: {}", result.backend);
    println!("Size:    {} bytes", result.size);
    println!("Version: {}", result.version);
    println!("Boxes:   {}", result.boxes);
    if result.needs_save {
        println!("         (file will be rewritten on next load)");
    }
    println!();
    println!("Occupied slots:");
    for generation in Generation::ALL {
        let key = generation.to_string();
        let count = result.occupied.get(&key).copied().unwrap_or(0);
        println!("  {key:<5} {count}");
    }
    println!();
    println!("Boxes:");
    for b in &result.box_details {
        println!(
            "  [{:>3}] {:<24} {:>2}/{}",
            b.index, b.name, b.occupied, SLOTS_PER_BOX
        );
    }

    if let Some(slots) = &result.slots {
        println!();
        println!("Slots:");
        for s in slots {
            println!(
                "  box {:>3} slot {:>2}: {} species {}",
                s.box_index, s.slot, s.generation, s.species
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(prefer_archive: bool, on_removable: bool, on_archive: bool) -> Probe {
        Probe {
            legacy_name: false,
            legacy_file: false,
            prefer_archive,
            on_removable,
            on_archive,
        }
    }

    #[test]
    fn reads_what_open_would_load() {
        assert_eq!(
            source_backend(&probe(false, true, true)),
            Some(BackendKind::Archive)
        );
        assert_eq!(
            source_backend(&probe(true, true, false)),
            Some(BackendKind::Removable)
        );
        assert_eq!(
            source_backend(&probe(false, true, false)),
            Some(BackendKind::Removable)
        );
        assert_eq!(
            source_backend(&probe(true, true, true)),
            Some(BackendKind::Removable)
        );
    }

    #[test]
    fn pending_legacy_bank_has_no_source() {
        let legacy = Probe {
            legacy_name: true,
            legacy_file: true,
            ..probe(true, false, false)
        };
        assert_eq!(source_backend(&legacy), None);
    }
}
