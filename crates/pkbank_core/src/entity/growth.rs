//! Experience curves, used to recover a level from stored experience.

use serde::{Deserialize, Serialize};

/// One of the six standard experience curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthRate {
    /// 600,000 experience at level 100.
    Erratic,
    /// 800,000.
    Fast,
    /// 1,000,000.
    MediumFast,
    /// 1,059,860.
    MediumSlow,
    /// 1,250,000.
    Slow,
    /// 1,640,000.
    Fluctuating,
}

/// Highest reachable level.
pub const MAX_LEVEL: u8 = 100;

impl GrowthRate {
    /// Minimum experience required to be at `level`.
    #[must_use]
    pub fn experience_for(self, level: u8) -> u32 {
        let n = i64::from(level.clamp(1, MAX_LEVEL));
        if n == 1 {
            return 0;
        }
        let cube = n * n * n;
        let exp = match self {
            Self::Erratic => match n {
                0..=49 => cube * (100 - n) / 50,
                50..=67 => cube * (150 - n) / 100,
                68..=97 => cube * ((1911 - 10 * n) / 3) / 500,
                _ => cube * (160 - n) / 100,
            },
            Self::Fast => 4 * cube / 5,
            Self::MediumFast => cube,
            Self::MediumSlow => 6 * cube / 5 - 15 * n * n + 100 * n - 140,
            Self::Slow => 5 * cube / 4,
            Self::Fluctuating => match n {
                0..=14 => cube * ((n + 1) / 3 + 24) / 50,
                15..=35 => cube * (n + 14) / 50,
                _ => cube * (n / 2 + 32) / 50,
            },
        };
        u32::try_from(exp.max(0)).unwrap_or(u32::MAX)
    }

    /// Level reached with `experience` points.
    #[must_use]
    pub fn level_for(self, experience: u32) -> u8 {
        (1..=MAX_LEVEL)
            .rev()
            .find(|&level| self.experience_for(level) <= experience)
            .unwrap_or(1)
    }
}

/// Per-species reference data consulted during legacy conversion.
pub trait SpeciesData: Send + Sync {
    /// Experience curve of `species`, or `None` if the species is unknown.
    fn growth_rate(&self, species: u16) -> Option<GrowthRate>;

    /// Level of a record of `species` holding `experience` points.
    fn level(&self, species: u16, experience: u32) -> Option<u8> {
        self.growth_rate(species).map(|rate| rate.level_for(experience))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [GrowthRate; 6] = [
        GrowthRate::Erratic,
        GrowthRate::Fast,
        GrowthRate::MediumFast,
        GrowthRate::MediumSlow,
        GrowthRate::Slow,
        GrowthRate::Fluctuating,
    ];

    #[test]
    fn level_100_thresholds() {
        assert_eq!(GrowthRate::Erratic.experience_for(100), 600_000);
        assert_eq!(GrowthRate::Fast.experience_for(100), 800_000);
        assert_eq!(GrowthRate::MediumFast.experience_for(100), 1_000_000);
        assert_eq!(GrowthRate::MediumSlow.experience_for(100), 1_059_860);
        assert_eq!(GrowthRate::Slow.experience_for(100), 1_250_000);
        assert_eq!(GrowthRate::Fluctuating.experience_for(100), 1_640_000);
    }

    #[test]
    fn curves_are_monotonic() {
        for rate in ALL {
            for level in 2..=MAX_LEVEL {
                assert!(
                    rate.experience_for(level) > rate.experience_for(level - 1),
                    "{rate:?} not increasing at level {level}"
                );
            }
        }
    }

    #[test]
    fn level_for_boundaries() {
        assert_eq!(GrowthRate::MediumFast.level_for(0), 1);
        assert_eq!(GrowthRate::MediumFast.level_for(999_999), 99);
        assert_eq!(GrowthRate::MediumFast.level_for(1_000_000), 100);
        assert_eq!(GrowthRate::MediumFast.level_for(u32::MAX), 100);
        assert_eq!(GrowthRate::MediumSlow.level_for(9), 2);
    }

    #[test]
    fn growth_rates_use_snake_case_names() {
        let rate: GrowthRate = serde_json::from_str("\"medium_slow\"").unwrap();
        assert_eq!(rate, GrowthRate::MediumSlow);
        assert_eq!(serde_json::to_string(&GrowthRate::Erratic).unwrap(), "\"erratic\"");
    }

    struct OnlyBulbasaur;

    impl SpeciesData for OnlyBulbasaur {
        fn growth_rate(&self, species: u16) -> Option<GrowthRate> {
            (species == 1).then_some(GrowthRate::MediumSlow)
        }
    }

    #[test]
    fn species_data_level() {
        assert_eq!(OnlyBulbasaur.level(1, 1_059_860), Some(100));
        assert_eq!(OnlyBulbasaur.level(2, 1_059_860), None);
    }
}
