// Data-driven game configuration.
//
// All tunable parameters live in `GameConfig`, loaded from JSON or built
// from `Default`. The sim never uses magic numbers: reveal distances, lock
// frequencies, content weight tables, amount tiers and era budgets are all
// read from here. Partial JSON is accepted (missing fields fall back to the
// defaults), and `GameConfig::from_json` validates the result.
//
// Parameters are grouped into nested structs: `LockParams` for the lock
// roll, `ContentParams` for the node-contents decision tree (with one
// `AmountTiers` per modifier).
//
// See also: `state.rs` which owns the `GameConfig` as part of `GameState`,
// `contents.rs` and `lock.rs` for the factories that read these parameters.
//
// **Critical constraint: determinism.** Config values feed directly into
// world generation. The same seed under a different config is a different
// world.

use crate::contents::{ContentKind, LineCount};
use crate::error::ConfigError;
use crate::types::{Attribute, Modifier};
use serde::{Deserialize, Serialize};
use skilltree_prng::{DiceFormula, UniformRange, WeightTable};

/// Seed used when the caller does not supply one.
pub const DEFAULT_SEED: u32 = 0x19283;

// ---------------------------------------------------------------------------
// Lock parameters
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockParams {
    /// Probability that a node outside the starter area is locked.
    pub frequency: f64,
    /// Probability inside the starter area.
    pub starter_area_frequency: f64,
    /// Taxicab radius of the starter area around the origin.
    pub starter_area_radius: u32,
    /// Taxicab radius around the origin that never has locks, so the first
    /// ring is always allocatable.
    pub lock_free_radius: u32,
    /// Short label shown on a locked node.
    pub short_text_target: String,
}

impl Default for LockParams {
    fn default() -> Self {
        Self {
            frequency: 0.47,
            starter_area_frequency: 0.2,
            starter_area_radius: 7,
            lock_free_radius: 1,
            short_text_target: "🔒".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Content parameters
// ---------------------------------------------------------------------------

/// Amount distributions for one modifier.
///
/// Single-line nodes use `primary`. Double-line nodes use `primary` for the
/// first line and `secondary` for the second, or the `large_*` pair when
/// the large-node roll succeeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountTiers {
    pub primary: UniformRange,
    pub secondary: UniformRange,
    pub large_primary: UniformRange,
    pub large_secondary: UniformRange,
}

impl AmountTiers {
    pub fn flat() -> Self {
        Self {
            primary: UniformRange::stepped(20, 24, 2),
            secondary: UniformRange::stepped(6, 10, 2),
            large_primary: UniformRange::stepped(40, 50, 5),
            large_secondary: UniformRange::stepped(10, 20, 5),
        }
    }

    pub fn increased() -> Self {
        Self {
            primary: UniformRange::stepped(5, 7, 1),
            secondary: UniformRange::stepped(1, 3, 1),
            large_primary: UniformRange::stepped(8, 10, 1),
            large_secondary: UniformRange::stepped(3, 5, 1),
        }
    }

    fn all_valid(&self) -> bool {
        [
            self.primary,
            self.secondary,
            self.large_primary,
            self.large_secondary,
        ]
        .iter()
        .all(UniformRange::is_valid)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentParams {
    /// Taxicab radius inside which `starter_modifier_weights` applies.
    pub starter_area_radius: u32,
    /// Top-level roll: empty node, plain node, or node with a spend cost.
    pub root_weights: WeightTable<ContentKind>,
    pub line_count_weights: WeightTable<LineCount>,
    pub attribute_weights: WeightTable<Attribute>,
    pub modifier_weights: WeightTable<Modifier>,
    pub starter_modifier_weights: WeightTable<Modifier>,
    /// Which attribute a spend condition consumes.
    pub spend_attribute_weights: WeightTable<Attribute>,
    pub spend_dice: DiceFormula,
    pub spend_plus: i32,
    /// Chance that a double-line node rolls from the large tiers.
    pub large_node_chance: f64,
    pub flat_tiers: AmountTiers,
    pub increased_tiers: AmountTiers,
}

impl ContentParams {
    pub fn tiers(&self, modifier: Modifier) -> &AmountTiers {
        match modifier {
            Modifier::Flat => &self.flat_tiers,
            Modifier::Increased => &self.increased_tiers,
        }
    }
}

impl Default for ContentParams {
    fn default() -> Self {
        Self {
            starter_area_radius: 7,
            root_weights: WeightTable::fixed(vec![
                (ContentKind::Empty, 80),
                (ContentKind::NoSpend, 10),
                (ContentKind::Spend, 1),
            ]),
            line_count_weights: WeightTable::fixed(vec![
                (LineCount::Single, 200),
                (LineCount::Double, 500),
            ]),
            attribute_weights: WeightTable::fixed(vec![
                (Attribute::Red0, 100),
                (Attribute::Red1, 100),
                (Attribute::Red2, 100),
                (Attribute::Del0, 10),
                (Attribute::Del1, 10),
                (Attribute::Del2, 10),
            ]),
            modifier_weights: WeightTable::fixed(vec![
                (Modifier::Flat, 150),
                (Modifier::Increased, 100),
            ]),
            starter_modifier_weights: WeightTable::fixed(vec![
                (Modifier::Flat, 400),
                (Modifier::Increased, 100),
            ]),
            spend_attribute_weights: WeightTable::fixed(vec![
                (Attribute::Red0, 1),
                (Attribute::Red1, 1),
                (Attribute::Red2, 1),
            ]),
            spend_dice: DiceFormula { count: 2, pips: 6 },
            spend_plus: 6,
            large_node_chance: 1.0 / 3.0,
            flat_tiers: AmountTiers::flat(),
            increased_tiers: AmountTiers::increased(),
        }
    }
}

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// BFS radius revealed (to `Unreachable`) around each taken node.
    pub fog_of_war_distance: u32,
    /// BFS radius made `Available` and reachable around each taken node.
    pub available_distance: u32,
    /// BFS radius marked accessible around taken nodes in exploration eras.
    pub accessible_distance: u32,
    /// Cap on path-highlight searches, so they terminate on the infinite
    /// lattice.
    pub path_search_limit: u32,
    /// Whether `Up`/`Down` neighbors between layers exist.
    pub vertical_neighbors: bool,
    /// Coordinate scale between adjacent layers.
    pub z_scale_factor: i32,
    /// Deallocation points granted on entering each optimization era.
    pub deallocation_points_per_era: u32,
    /// Allocation points granted per era index; the last entry repeats.
    /// `None` means allocations are unlimited.
    pub era_allocation_points: Option<Vec<u32>>,
    pub locks: LockParams,
    pub contents: ContentParams,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fog_of_war_distance: 3,
            available_distance: 1,
            accessible_distance: 3,
            path_search_limit: 32,
            vertical_neighbors: false,
            z_scale_factor: 4,
            deallocation_points_per_era: 3,
            era_allocation_points: None,
            locks: LockParams::default(),
            contents: ContentParams::default(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let frequencies = [
            ("locks.frequency", self.locks.frequency),
            (
                "locks.starter_area_frequency",
                self.locks.starter_area_frequency,
            ),
            ("contents.large_node_chance", self.contents.large_node_chance),
        ];
        for (field, value) in frequencies {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::FrequencyOutOfRange { field, value });
            }
        }
        if !self.contents.flat_tiers.all_valid() {
            return Err(ConfigError::InvalidRange {
                field: "contents.flat_tiers",
            });
        }
        if !self.contents.increased_tiers.all_valid() {
            return Err(ConfigError::InvalidRange {
                field: "contents.increased_tiers",
            });
        }
        if self.available_distance > self.fog_of_war_distance {
            return Err(ConfigError::DistanceOrder {
                available: self.available_distance,
                fog: self.fog_of_war_distance,
            });
        }
        if self.z_scale_factor < 2 {
            return Err(ConfigError::ZScale(self.z_scale_factor));
        }
        Ok(())
    }

    /// Points granted in era `index`, or `None` when unlimited.
    pub fn era_points(&self, index: u32) -> Option<u32> {
        let points = self.era_allocation_points.as_ref()?;
        let last = points.len().checked_sub(1)?;
        Some(points[(index as usize).min(last)])
    }

    /// Points granted across eras `0..=index`, or `None` when unlimited.
    /// Saturates at `u32::MAX`.
    pub fn cumulative_era_points(&self, index: u32) -> Option<u32> {
        let points = self.era_allocation_points.as_ref()?;
        let last = *points.last()?;
        let eras = u64::from(index) + 1;
        let listed = points.len().min(eras as usize);
        let head = points[..listed]
            .iter()
            .fold(0u32, |total, p| total.saturating_add(*p));
        let repeats = u32::try_from(eras - listed as u64).unwrap_or(u32::MAX);
        Some(head.saturating_add(last.saturating_mul(repeats)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn default_config_serializes() {
        let config = GameConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let restored = GameConfig::from_json(&json).unwrap();
        assert_eq!(config, restored);
    }

    #[test]
    fn partial_json_takes_defaults() {
        let config = GameConfig::from_json(r#"{"fog_of_war_distance": 6}"#).unwrap();
        assert_eq!(config.fog_of_war_distance, 6);
        assert_eq!(config.available_distance, 1);
        assert_eq!(config.locks.frequency, 0.47);
    }

    #[test]
    fn nested_partial_json() {
        let config =
            GameConfig::from_json(r#"{"locks": {"frequency": 0.1}, "vertical_neighbors": true}"#)
                .unwrap();
        assert_eq!(config.locks.frequency, 0.1);
        assert_eq!(config.locks.starter_area_radius, 7);
        assert!(config.vertical_neighbors);
    }

    #[test]
    fn weight_tables_load_in_order() {
        let json = r#"{"contents": {"root_weights": [["Spend", 1], ["Empty", 5]]}}"#;
        let config = GameConfig::from_json(json).unwrap();
        let entries = config.contents.root_weights.entries();
        assert_eq!(entries[0], (ContentKind::Spend, 1));
        assert_eq!(entries[1], (ContentKind::Empty, 5));
    }

    #[test]
    fn rejects_zero_weight_table() {
        let json = r#"{"contents": {"modifier_weights": [["Flat", 0]]}}"#;
        assert!(matches!(
            GameConfig::from_json(json),
            Err(ConfigError::Json(_))
        ));
        let json = r#"{"contents": {"attribute_weights": []}}"#;
        match GameConfig::from_json(json) {
            Err(ConfigError::Json(e)) => {
                assert!(e.to_string().contains("weight table has no entries"), "{e}");
            }
            other => panic!("expected a JSON error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_frequency() {
        let json = r#"{"locks": {"frequency": 1.5}}"#;
        assert!(matches!(
            GameConfig::from_json(json),
            Err(ConfigError::FrequencyOutOfRange { field: "locks.frequency", .. })
        ));
    }

    #[test]
    fn rejects_available_beyond_fog() {
        let json = r#"{"fog_of_war_distance": 1, "available_distance": 2}"#;
        assert!(matches!(
            GameConfig::from_json(json),
            Err(ConfigError::DistanceOrder { .. })
        ));
    }

    #[test]
    fn rejects_inverted_range() {
        let mut config = GameConfig::default();
        config.contents.flat_tiers.primary = UniformRange::stepped(10, 5, 1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { .. })
        ));
    }

    #[test]
    fn era_points_repeat_last_entry() {
        let mut config = GameConfig::default();
        assert_eq!(config.era_points(0), None);
        assert_eq!(config.cumulative_era_points(3), None);

        config.era_allocation_points = Some(vec![5, 3]);
        assert_eq!(config.era_points(0), Some(5));
        assert_eq!(config.era_points(1), Some(3));
        assert_eq!(config.era_points(9), Some(3));
        assert_eq!(config.cumulative_era_points(2), Some(11));
        assert_eq!(config.cumulative_era_points(0), Some(5));

        config.era_allocation_points = Some(vec![]);
        assert_eq!(config.cumulative_era_points(0), None);
    }

    #[test]
    fn cumulative_era_points_saturate() {
        let mut config = GameConfig::default();
        config.era_allocation_points = Some(vec![u32::MAX, u32::MAX]);
        assert_eq!(config.cumulative_era_points(0), Some(u32::MAX));
        assert_eq!(config.cumulative_era_points(1), Some(u32::MAX));

        config.era_allocation_points = Some(vec![1, 2]);
        assert_eq!(config.cumulative_era_points(u32::MAX), Some(u32::MAX));
        assert_eq!(config.cumulative_era_points(4), Some(9));
    }
}
