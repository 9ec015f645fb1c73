//! Tunable game rules.
//!
//! Pure data, deserializable from RON. Loading files is the caller's
//! concern; this module only defines the shape, the defaults, and
//! validation.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::grid::TileType;
use crate::math::Fixed;
use crate::unit_kind::{CapabilityTable, UnitKind};

/// Money earned per turn by an intact, unburning tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitTable {
    /// City tile profit.
    pub city: u32,
    /// Forest tile profit.
    pub forest: u32,
    /// Grassland tile profit.
    pub grassland: u32,
}

impl ProfitTable {
    /// Profit for a tile of the given type.
    #[must_use]
    pub const fn for_type(&self, tile_type: TileType) -> u32 {
        match tile_type {
            TileType::City => self.city,
            TileType::Forest => self.forest,
            TileType::Grassland => self.grassland,
            _ => 0,
        }
    }
}

impl Default for ProfitTable {
    fn default() -> Self {
        Self {
            city: 3,
            forest: 1,
            grassland: 1,
        }
    }
}

/// Multipliers that turn tile counts into end-of-game report figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatMultipliers {
    /// Homes per City tile.
    pub homes_per_city_tile: u32,
    /// Acres per Forest tile.
    pub acres_per_forest_tile: u32,
    /// Firefighters per unit.
    pub crew_per_unit: u32,
}

impl Default for StatMultipliers {
    fn default() -> Self {
        Self {
            homes_per_city_tile: 25,
            acres_per_forest_tile: 40,
            crew_per_unit: 4,
        }
    }
}

/// All tunable rules for a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Probability that a burning tile ignites an eligible neighbor per turn.
    pub fire_spread_chance: f64,
    /// Turns a new fire burns before going out on its own.
    pub fire_life: u32,
    /// Action points spent by a Dig step.
    pub dig_cost: u32,
    /// Action points spent by an Extinguish step.
    pub extinguish_cost: u32,
    /// Per-tile-type income.
    pub profits: ProfitTable,
    /// Per-unit-kind capabilities.
    pub units: CapabilityTable,
    /// End-of-game report multipliers.
    pub stats: StatMultipliers,
    /// Camps that may be placed during setup.
    pub max_camps: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            fire_spread_chance: 0.2,
            fire_life: 4,
            dig_cost: 1,
            extinguish_cost: 1,
            profits: ProfitTable::default(),
            units: CapabilityTable::default(),
            stats: StatMultipliers::default(),
            max_camps: 2,
        }
    }
}

impl Rules {
    /// Check that every value is usable by the simulation.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fire_spread_chance) {
            return Err(GameError::InvalidRules(format!(
                "fire_spread_chance {} is not a probability",
                self.fire_spread_chance
            )));
        }
        if self.fire_life == 0 {
            return Err(GameError::InvalidRules("fire_life must be positive".into()));
        }
        for kind in UnitKind::ALL {
            let caps = self.units.get(kind);
            if caps.range == 0 {
                return Err(GameError::InvalidRules(format!(
                    "{kind:?} range must be positive"
                )));
            }
            if caps.forest_cost.is_some_and(|c| c <= Fixed::ZERO) {
                return Err(GameError::InvalidRules(format!(
                    "{kind:?} forest_cost must be positive or absent"
                )));
            }
        }
        Ok(())
    }

    /// Action points spent by a Dig step.
    #[must_use]
    pub fn dig_cost(&self) -> Fixed {
        Fixed::from_num(self.dig_cost)
    }

    /// Action points spent by an Extinguish step.
    #[must_use]
    pub fn extinguish_cost(&self) -> Fixed {
        Fixed::from_num(self.extinguish_cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        assert!(Rules::default().validate().is_ok());
    }

    #[test]
    fn test_spread_chance_must_be_probability() {
        let rules = Rules {
            fire_spread_chance: 1.5,
            ..Rules::default()
        };
        assert!(matches!(rules.validate(), Err(GameError::InvalidRules(_))));
    }

    #[test]
    fn test_zero_fire_life_rejected() {
        let rules = Rules {
            fire_life: 0,
            ..Rules::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_zero_range_rejected() {
        let mut rules = Rules::default();
        rules.units.truck.range = 0;
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_profit_table() {
        let profits = ProfitTable::default();
        assert_eq!(profits.for_type(TileType::City), 3);
        assert_eq!(profits.for_type(TileType::Forest), 1);
        assert_eq!(profits.for_type(TileType::Grassland), 1);
        assert_eq!(profits.for_type(TileType::Burnt), 0);
        assert_eq!(profits.for_type(TileType::Water), 0);
    }

    #[test]
    fn test_partial_ron_override() {
        let rules: Rules = ron::from_str("(fire_spread_chance: 0.5, max_camps: 3)").unwrap();
        assert!((rules.fire_spread_chance - 0.5).abs() < f64::EPSILON);
        assert_eq!(rules.max_camps, 3);
        assert_eq!(rules.fire_life, Rules::default().fire_life);
        assert!(rules.validate().is_ok());
    }
}
