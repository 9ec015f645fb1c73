//! Scenario loading and configuration.
//!
//! A scenario supplies everything the core needs at level start: terrain,
//! the playable region, starting fires, money, camps and the RNG seed.
//! Terrain rows use the one-character tile symbols of
//! [`TileType::from_symbol`], with row `j = 0` first.

use std::path::Path;

use fireline_core::error::GameError;
use fireline_core::prelude::*;
use std::result::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// The scenario describes a map the core cannot build.
    #[error("Invalid scenario: {0}")]
    Invalid(String),
    /// The core rejected part of the setup.
    #[error("Scenario setup failed: {0}")]
    Game(#[from] GameError),
}

/// Playable sub-rectangle of the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledRegion {
    /// Lowest enabled (i, j).
    pub min: (u32, u32),
    /// Enabled width and height.
    pub size: (u32, u32),
}

/// The three built-in levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    /// One fire, 500 to spend.
    One,
    /// Two fires, 1000 to spend.
    Two,
    /// Four fires, 2000 to spend.
    Three,
}

impl Level {
    /// Starting fires.
    #[must_use]
    pub fn fires(self) -> Vec<(u32, u32)> {
        match self {
            Self::One => vec![(18, 37)],
            Self::Two => vec![(8, 35), (18, 40)],
            Self::Three => vec![(8, 34), (6, 37), (18, 33), (18, 41)],
        }
    }

    /// Starting treasury.
    #[must_use]
    pub const fn money(self) -> u32 {
        match self {
            Self::One => 500,
            Self::Two => 1000,
            Self::Three => 2000,
        }
    }

    /// Parse a level name as used on the command line.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "level1" | "1" => Some(Self::One),
            "level2" | "2" => Some(Self::Two),
            "level3" | "3" => Some(Self::Three),
            _ => None,
        }
    }
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Terrain rows, one symbol per tile.
    pub terrain: Vec<String>,
    /// Playable region; the whole map when absent.
    #[serde(default)]
    pub enabled: Option<EnabledRegion>,
    /// Tiles burning at the start.
    #[serde(default)]
    pub fires: Vec<(u32, u32)>,
    /// Starting treasury.
    pub money: u32,
    /// Camps placed during setup.
    #[serde(default)]
    pub camps: Vec<(u32, u32)>,
    /// Fire spread seed.
    #[serde(default)]
    pub seed: u64,
    /// Rules override; defaults when absent.
    #[serde(default)]
    pub rules: Option<Rules>,
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Resolve a scenario argument: a built-in level name or a RON path.
    pub fn resolve(name_or_path: &str) -> Result<Self, ScenarioError> {
        match Level::from_name(name_or_path) {
            Some(level) => Ok(Self::level(level)),
            None => Self::load(name_or_path),
        }
    }

    /// One of the built-in levels on the river valley map.
    #[must_use]
    pub fn level(level: Level) -> Self {
        Self {
            name: format!("Level {}", level as u8 + 1),
            description: "River valley with a town in the south".to_string(),
            terrain: valley_terrain(),
            enabled: None,
            fires: level.fires(),
            money: level.money(),
            camps: vec![(4, 44), (9, 44)],
            seed: 0,
            rules: None,
        }
    }

    /// Replace the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Build the grid described by the terrain rows.
    pub fn build_grid(&self) -> Result<Grid, ScenarioError> {
        let height = self.terrain.len();
        let width = self.terrain.first().map_or(0, |row| row.chars().count());
        if width == 0 {
            return Err(ScenarioError::Invalid("terrain is empty".to_string()));
        }

        let mut tiles = Vec::with_capacity(width * height);
        for (j, row) in self.terrain.iter().enumerate() {
            if row.chars().count() != width {
                return Err(ScenarioError::Invalid(format!(
                    "row {j} has {} tiles, expected {width}",
                    row.chars().count()
                )));
            }
            for (i, symbol) in row.chars().enumerate() {
                let tile_type = TileType::from_symbol(symbol).ok_or_else(|| {
                    ScenarioError::Invalid(format!("unknown symbol '{symbol}' at ({i}, {j})"))
                })?;
                tiles.push(tile_type);
            }
        }

        let to_u32 = |n: usize| {
            u32::try_from(n).map_err(|_| ScenarioError::Invalid("map is too large".to_string()))
        };
        let grid = Grid::new(to_u32(width)?, to_u32(height)?, tiles)?;

        Ok(match self.enabled {
            Some(region) => grid.with_enabled_region(
                TileCoord::new(region.min.0, region.min.1),
                region.size,
            ),
            None => grid,
        })
    }

    /// Build a match in its setup phase, with camps placed and fires lit.
    pub fn build_simulation(&self) -> Result<Simulation, ScenarioError> {
        let rules = self.rules.clone().unwrap_or_default();
        let mut sim = Simulation::new(self.build_grid()?, rules, self.seed, self.money)?;
        for &(i, j) in &self.camps {
            sim.place_camp(TileCoord::new(i, j))?;
        }
        for &(i, j) in &self.fires {
            sim.start_fire(TileCoord::new(i, j))?;
        }
        tracing::info!(
            scenario = %self.name,
            width = sim.grid().width(),
            height = sim.grid().height(),
            fires = self.fires.len(),
            seed = self.seed,
            "Scenario loaded"
        );
        Ok(sim)
    }
}

/// The 28x48 map the built-in levels are played on.
///
/// Grassland with scattered forest, a river down the east side, and a
/// town in the south.
fn valley_terrain() -> Vec<String> {
    const WIDTH: u32 = 28;
    const HEIGHT: u32 = 48;

    (0..HEIGHT)
        .map(|j| {
            (0..WIDTH)
                .map(|i| {
                    let tile = match (i, j) {
                        (2..=11, 42..=46) => TileType::City,
                        _ if i == 23 + (j / 8) % 2 => TileType::Water,
                        _ if (i * 7 + j * 3) % 11 < 4 => TileType::Forest,
                        _ => TileType::Grassland,
                    };
                    tile.symbol()
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SMALL: &str = r#"
        Scenario(
            name: "Creek",
            description: "Small test map",
            terrain: [
                "C.F.",
                "..FW",
                "C..W",
            ],
            fires: [(2, 1)],
            money: 300,
            camps: [(0, 0)],
            seed: 9,
        )
    "#;

    #[test]
    fn test_parse_from_ron() {
        let scenario = Scenario::from_ron_str(SMALL).unwrap();
        assert_eq!(scenario.name, "Creek");
        assert_eq!(scenario.money, 300);
        assert_eq!(scenario.fires, vec![(2, 1)]);
        assert!(scenario.rules.is_none());
        assert!(scenario.enabled.is_none());
    }

    #[test]
    fn test_build_simulation_places_setup() {
        let sim = Scenario::from_ron_str(SMALL)
            .unwrap()
            .build_simulation()
            .unwrap();
        assert_eq!(sim.phase(), TurnPhase::Setup);
        assert_eq!(sim.grid().width(), 4);
        assert_eq!(sim.grid().height(), 3);
        assert_eq!(sim.grid().camps(), &[TileCoord::new(0, 0)]);
        assert!(sim.grid().is_burning(TileCoord::new(2, 1)));
        assert_eq!(sim.treasury().balance, 300);
    }

    #[test]
    fn test_rules_override_and_enabled_region() {
        let ron = r#"
            Scenario(
                name: "Override",
                terrain: ["....", "....", "...."],
                enabled: Some(EnabledRegion(min: (1, 0), size: (2, 3))),
                money: 0,
                rules: Some(Rules(fire_spread_chance: 1.0)),
            )
        "#;
        let scenario = Scenario::from_ron_str(ron).unwrap();
        let sim = scenario.build_simulation().unwrap();
        assert!((sim.rules().fire_spread_chance - 1.0).abs() < f64::EPSILON);
        assert_eq!(sim.rules().fire_life, Rules::default().fire_life);
        assert!(sim.grid().tile(TileCoord::new(0, 0)).unwrap().disabled);
        assert!(!sim.grid().tile(TileCoord::new(1, 0)).unwrap().disabled);
    }

    #[test]
    fn test_ragged_terrain_rejected() {
        let scenario = Scenario {
            terrain: vec!["...".to_string(), "..".to_string()],
            ..Scenario::level(Level::One)
        };
        assert!(matches!(
            scenario.build_grid(),
            Err(ScenarioError::Invalid(_))
        ));
    }

    #[test]
    fn test_unknown_symbol_rejected() {
        let scenario = Scenario {
            terrain: vec!["..?".to_string()],
            ..Scenario::level(Level::One)
        };
        let err = scenario.build_grid().unwrap_err();
        assert!(err.to_string().contains("'?'"));
    }

    #[test]
    fn test_fire_on_disabled_tile_is_a_game_error() {
        let scenario = Scenario {
            terrain: vec!["...".to_string()],
            enabled: Some(EnabledRegion {
                min: (0, 0),
                size: (1, 1),
            }),
            fires: vec![(2, 0)],
            camps: Vec::new(),
            ..Scenario::level(Level::One)
        };
        assert!(matches!(
            scenario.build_simulation(),
            Err(ScenarioError::Game(GameError::TileDisabled(_)))
        ));
    }

    #[test]
    fn test_level_presets() {
        for (level, fires, money) in [
            (Level::One, 1, 500),
            (Level::Two, 2, 1000),
            (Level::Three, 4, 2000),
        ] {
            let scenario = Scenario::level(level);
            assert_eq!(scenario.fires.len(), fires);
            assert_eq!(scenario.money, money);

            let sim = scenario.build_simulation().unwrap();
            assert_eq!(sim.grid().burning().len(), fires);
            assert_eq!(sim.grid().camps().len(), 2);
        }
    }

    #[test]
    fn test_resolve_level_names() {
        assert_eq!(
            Scenario::resolve("level2").unwrap(),
            Scenario::level(Level::Two)
        );
        assert!(matches!(
            Scenario::resolve("no/such/file.ron"),
            Err(ScenarioError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SMALL.as_bytes()).unwrap();

        let scenario = Scenario::load(file.path()).unwrap();
        assert_eq!(scenario.seed, 9);
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Scenario(name: ").unwrap();

        assert!(matches!(
            Scenario::load(file.path()),
            Err(ScenarioError::ParseError(_))
        ));
    }
}
