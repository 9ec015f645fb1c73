//! Test fixtures and helpers.
//!
//! Maps are written as ASCII rows, one character per tile, using the
//! symbols of [`TileType::from_symbol`]:
//!
//! ```text
//! .  Grassland    F  Forest    W  Water    C  City
//! B  Burnt        #  Fireline  X  CityFireline   _  None
//! ```
//!
//! Row 0 comes first. Odd rows are the ones shifted half a tile right.

use fireline_core::grid::{Grid, TileCoord, TileType};
use fireline_core::rules::Rules;
use fireline_core::simulation::Simulation;
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Shorthand for tile coordinates.
#[must_use]
pub const fn tile(i: u32, j: u32) -> TileCoord {
    TileCoord::new(i, j)
}

/// Build a grid from ASCII rows.
///
/// # Panics
///
/// Panics on ragged rows or unknown symbols.
#[must_use]
pub fn grid_from_ascii(rows: &[&str]) -> Grid {
    let height = rows.len();
    let width = rows.first().map_or(0, |r| r.chars().count());
    let mut terrain = Vec::with_capacity(width * height);

    for (j, row) in rows.iter().enumerate() {
        assert_eq!(
            row.chars().count(),
            width,
            "row {j} has a different width than row 0"
        );
        for symbol in row.chars() {
            let tile_type = TileType::from_symbol(symbol)
                .unwrap_or_else(|| panic!("unknown map symbol {symbol:?} in row {j}"));
            terrain.push(tile_type);
        }
    }

    Grid::new(width as u32, height as u32, terrain).expect("fixture grid must be valid")
}

/// A grid of nothing but grassland.
#[must_use]
pub fn open_field(width: u32, height: u32) -> Grid {
    Grid::uniform(width, height, TileType::Grassland).expect("fixture grid must be valid")
}

/// Render a grid back into ASCII rows.
#[must_use]
pub fn grid_to_ascii(grid: &Grid) -> Vec<String> {
    (0..grid.height())
        .map(|j| {
            (0..grid.width())
                .map(|i| grid.tile(tile(i, j)).map_or('?', |t| t.tile_type.symbol()))
                .collect()
        })
        .collect()
}

/// Builder for a simulation in its setup phase.
#[derive(Debug, Clone)]
pub struct MatchBuilder {
    grid: Grid,
    rules: Rules,
    seed: u64,
    money: u32,
    fires: Vec<TileCoord>,
    camps: Vec<TileCoord>,
}

impl MatchBuilder {
    /// Start from an ASCII map with default rules, seed 0 and no money.
    #[must_use]
    pub fn new(rows: &[&str]) -> Self {
        Self {
            grid: grid_from_ascii(rows),
            rules: Rules::default(),
            seed: 0,
            money: 0,
            fires: Vec::new(),
            camps: Vec::new(),
        }
    }

    /// Override the rules.
    #[must_use]
    pub fn rules(mut self, rules: Rules) -> Self {
        self.rules = rules;
        self
    }

    /// Set the fire spread chance.
    #[must_use]
    pub fn spread_chance(mut self, chance: f64) -> Self {
        self.rules.fire_spread_chance = chance;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the starting money.
    #[must_use]
    pub const fn money(mut self, money: u32) -> Self {
        self.money = money;
        self
    }

    /// Add a starting fire.
    #[must_use]
    pub fn fire(mut self, at: TileCoord) -> Self {
        self.fires.push(at);
        self
    }

    /// Add a camp.
    #[must_use]
    pub fn camp(mut self, at: TileCoord) -> Self {
        self.camps.push(at);
        self
    }

    /// Build the simulation, still in setup.
    ///
    /// # Panics
    ///
    /// Panics if the rules, a fire or a camp are invalid.
    #[must_use]
    pub fn build(self) -> Simulation {
        let mut sim = Simulation::new(self.grid, self.rules, self.seed, self.money)
            .expect("fixture rules must be valid");
        for at in self.fires {
            sim.start_fire(at).expect("fixture fire must be valid");
        }
        for at in self.camps {
            sim.place_camp(at).expect("fixture camp must be valid");
        }
        sim
    }

    /// Build the simulation and start the first player phase.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`MatchBuilder::build`].
    #[must_use]
    pub fn start(self) -> Simulation {
        let mut sim = self.build();
        sim.start().expect("fixture match must start");
        sim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_round_trip() {
        let rows = ["..F", "WC#"];
        let grid = grid_from_ascii(&rows);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.tile(tile(2, 0)).unwrap().tile_type, TileType::Forest);
        assert_eq!(grid.tile(tile(0, 1)).unwrap().tile_type, TileType::Water);
        assert_eq!(grid_to_ascii(&grid), vec!["..F", "WC#"]);
    }

    #[test]
    #[should_panic(expected = "unknown map symbol")]
    fn test_unknown_symbol_panics() {
        let _ = grid_from_ascii(&["..?"]);
    }

    #[test]
    fn test_builder_places_fires_and_camps() {
        let sim = MatchBuilder::new(&["CCC", "..."])
            .fire(tile(0, 1))
            .camp(tile(2, 0))
            .money(500)
            .start();
        assert!(sim.grid().is_burning(tile(0, 1)));
        assert_eq!(sim.grid().camps(), &[tile(2, 0)]);
        assert_eq!(sim.treasury().balance, 500);
    }
}
