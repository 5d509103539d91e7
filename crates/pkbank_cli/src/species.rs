//! Species table loaded from a JSON file.
//!
//! The file maps species numbers to experience curves:
//!
//! ```json
//! { "1": "medium_slow", "150": "slow" }
//! ```

use pkbank_core::{GrowthRate, SpeciesData};
use std::collections::HashMap;
use std::path::Path;

/// Growth rates by species, consulted when converting the legacy bank.
#[derive(Debug, Clone, Default)]
pub struct SpeciesFile {
    rates: HashMap<u16, GrowthRate>,
}

impl SpeciesFile {
    /// Reads a species table.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read(path)
            .map_err(|e| format!("Cannot read species table {}: {e}", path.display()))?;
        let rates = serde_json::from_slice(&data)
            .map_err(|e| format!("Invalid species table {}: {e}", path.display()))?;
        Ok(Self { rates })
    }
}

impl SpeciesData for SpeciesFile {
    fn growth_rate(&self, species: u16) -> Option<GrowthRate> {
        self.rates.get(&species).copied()
    }
}
