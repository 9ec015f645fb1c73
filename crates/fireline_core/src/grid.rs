//! Hex tile grid: storage, adjacency and coordinate conversions.
//!
//! Tiles use offset coordinates `(i, j)` where `i` is the column and `j`
//! the row. Odd rows are shifted right by half a tile, so the two
//! diagonal neighbors of a tile depend on the parity of its row.
//!
//! The grid owns every tile, unit, fire and camp. Mutators validate
//! their preconditions and return a [`GameError`] without touching
//! state when a precondition fails.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::components::{Fire, Unit, UnitId};
use crate::error::{GameError, Result};
use crate::events::GameEvent;
use crate::math::{Fixed, Vec2Fixed};
use crate::unit_kind::{UnitCapabilities, UnitKind};

/// Horizontal distance between hex centers in world units (sqrt(3) / 2).
const X_STRIDE: f64 = 0.866_025_403_784_438_6;

/// Vertical distance between hex rows in world units.
const Y_STRIDE: f64 = 0.75;

/// Terrain type of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileType {
    /// Open grass.
    #[default]
    Grassland,
    /// Woodland. Slow to cross.
    Forest,
    /// Already burned out. Cannot burn again.
    Burnt,
    /// Dug containment line. Cannot burn.
    Fireline,
    /// Impassable, cannot burn.
    Water,
    /// Homes. The thing being protected.
    City,
    /// City tile sacrificed for a fireline.
    CityFireline,
    /// No terrain.
    None,
}

impl TileType {
    /// Base cost to enter this tile type, ignoring unit kind.
    ///
    /// Returns `None` for impassable types. Forest reports its default
    /// cost of 2; unit-specific overrides come from [`UnitCapabilities`].
    #[must_use]
    pub fn base_cost(self) -> Option<Fixed> {
        match self {
            Self::Grassland | Self::Fireline | Self::CityFireline | Self::City | Self::Burnt => {
                Some(Fixed::ONE)
            }
            Self::Forest => Some(Fixed::from_num(2)),
            Self::Water | Self::None => None,
        }
    }

    /// Check if fire can spread onto this tile type.
    #[must_use]
    pub const fn is_flammable(self) -> bool {
        matches!(self, Self::Grassland | Self::Forest | Self::City)
    }

    /// Parse the one-character map symbol of a tile type.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        Some(match symbol {
            '.' => Self::Grassland,
            'F' => Self::Forest,
            'B' => Self::Burnt,
            '#' => Self::Fireline,
            'W' => Self::Water,
            'C' => Self::City,
            'X' => Self::CityFireline,
            '_' => Self::None,
            _ => return None,
        })
    }

    /// One-character map symbol.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Grassland => '.',
            Self::Forest => 'F',
            Self::Burnt => 'B',
            Self::Fireline => '#',
            Self::Water => 'W',
            Self::City => 'C',
            Self::CityFireline => 'X',
            Self::None => '_',
        }
    }
}

/// Offset coordinates of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column.
    pub i: u32,
    /// Row.
    pub j: u32,
}

impl TileCoord {
    /// Create tile coordinates.
    #[must_use]
    pub const fn new(i: u32, j: u32) -> Self {
        Self { i, j }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.i, self.j)
    }
}

/// One cell of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Tile {
    /// Terrain type.
    pub tile_type: TileType,
    /// Outside the playable sub-rectangle: impassable and non-scoring.
    pub disabled: bool,
    /// Unit standing on this tile.
    pub unit: Option<UnitId>,
    /// Fire burning on this tile.
    pub fire: Option<Fire>,
    /// Whether a camp stands on this tile.
    pub camp: bool,
}

impl Tile {
    /// Check if this tile is burning.
    #[must_use]
    pub const fn is_burning(&self) -> bool {
        self.fire.is_some()
    }
}

/// Running totals used for the end-of-game report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DamageCounters {
    /// City tiles that burned down.
    pub burnt_cities: u32,
    /// Forest tiles that burned down.
    pub burnt_forests: u32,
    /// Forest tiles cut for firelines.
    pub destroyed_forests: u32,
    /// City tiles cut for firelines.
    pub destroyed_cities: u32,
    /// Units killed by fire.
    pub casualties: u32,
}

/// The hex grid and everything standing on it.
#[derive(Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    enabled_min: TileCoord,
    enabled_size: (u32, u32),
    /// Tiles in row-major order (`j * width + i`).
    tiles: Vec<Tile>,
    units: BTreeMap<UnitId, Unit>,
    next_unit_id: UnitId,
    /// Burning tiles in ignition order.
    burning: Vec<TileCoord>,
    /// Camp tiles in placement order.
    camps: Vec<TileCoord>,
    counters: DamageCounters,
    events: Vec<GameEvent>,
}

impl Grid {
    /// Create a grid from caller-supplied terrain in row-major order.
    ///
    /// Every tile starts enabled; see [`Grid::with_enabled_region`].
    pub fn new(width: u32, height: u32, terrain: Vec<TileType>) -> Result<Self> {
        let expected = (width as usize) * (height as usize);
        if terrain.len() != expected || expected == 0 {
            return Err(GameError::TerrainSizeMismatch {
                expected,
                actual: terrain.len(),
            });
        }

        tracing::debug!(width, height, "Generating hex grid");

        let tiles = terrain
            .into_iter()
            .map(|tile_type| Tile {
                tile_type,
                ..Tile::default()
            })
            .collect();

        Ok(Self {
            width,
            height,
            enabled_min: TileCoord::new(0, 0),
            enabled_size: (width, height),
            tiles,
            units: BTreeMap::new(),
            next_unit_id: 1,
            burning: Vec::new(),
            camps: Vec::new(),
            counters: DamageCounters::default(),
            events: Vec::new(),
        })
    }

    /// Create a grid where every tile has the same type.
    pub fn uniform(width: u32, height: u32, tile_type: TileType) -> Result<Self> {
        Self::new(
            width,
            height,
            vec![tile_type; (width as usize) * (height as usize)],
        )
    }

    /// Restrict play to a sub-rectangle; tiles outside it become disabled.
    ///
    /// Intended for level setup, before anything is placed on the grid.
    #[must_use]
    pub fn with_enabled_region(mut self, min: TileCoord, size: (u32, u32)) -> Self {
        self.enabled_min = min;
        self.enabled_size = size;
        for index in 0..self.tiles.len() {
            let c = self.coord_of(index);
            let inside = min.i <= c.i
                && c.i < min.i.saturating_add(size.0)
                && min.j <= c.j
                && c.j < min.j.saturating_add(size.1);
            self.tiles[index].disabled = !inside;
        }
        self
    }

    // ------------------------------------------------------------------
    // Dimensions and coordinates
    // ------------------------------------------------------------------

    /// Grid width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Lower corner of the playable sub-rectangle.
    #[must_use]
    pub const fn enabled_min(&self) -> TileCoord {
        self.enabled_min
    }

    /// Size of the playable sub-rectangle.
    #[must_use]
    pub const fn enabled_size(&self) -> (u32, u32) {
        self.enabled_size
    }

    /// Total number of tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Always false; a grid has at least one tile.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Check if coordinates are within grid bounds.
    #[must_use]
    pub const fn in_bounds(&self, tile: TileCoord) -> bool {
        tile.i < self.width && tile.j < self.height
    }

    /// Fail with [`GameError::OutOfBounds`] unless `tile` is on the grid.
    pub fn validate(&self, tile: TileCoord) -> Result<()> {
        if self.in_bounds(tile) {
            Ok(())
        } else {
            Err(GameError::OutOfBounds {
                tile,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Convert coordinates to a row-major index.
    ///
    /// Callers must pass in-bounds coordinates.
    #[inline]
    #[must_use]
    pub fn index_of(&self, tile: TileCoord) -> usize {
        debug_assert!(self.in_bounds(tile), "tile {tile} out of bounds");
        (tile.j as usize) * (self.width as usize) + (tile.i as usize)
    }

    /// Convert a row-major index back to coordinates.
    #[inline]
    #[must_use]
    pub fn coord_of(&self, index: usize) -> TileCoord {
        let width = self.width as usize;
        TileCoord::new((index % width) as u32, (index / width) as u32)
    }

    /// Iterate over every coordinate in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.tiles.len()).map(|index| self.coord_of(index))
    }

    /// Tile at coordinates, or `None` if out of bounds.
    #[must_use]
    pub fn tile(&self, tile: TileCoord) -> Option<&Tile> {
        self.in_bounds(tile).then(|| &self.tiles[self.index_of(tile)])
    }

    /// Tile at coordinates, failing if out of bounds.
    pub fn tile_at(&self, tile: TileCoord) -> Result<&Tile> {
        self.validate(tile)?;
        Ok(&self.tiles[self.index_of(tile)])
    }

    fn tile_mut(&mut self, tile: TileCoord) -> Result<&mut Tile> {
        self.validate(tile)?;
        let index = self.index_of(tile);
        Ok(&mut self.tiles[index])
    }

    /// All tiles in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Hex neighbors of a tile, clipped to the grid bounds.
    ///
    /// Order: west, east, next row, previous row, then the two diagonals.
    /// Even rows take their diagonals from column `i - 1`, odd rows from
    /// column `i + 1`.
    #[must_use]
    pub fn neighbors(&self, tile: TileCoord) -> Vec<TileCoord> {
        let i = i64::from(tile.i);
        let j = i64::from(tile.j);
        let diag = if tile.j % 2 == 0 { i - 1 } else { i + 1 };
        let candidates = [
            (i - 1, j),
            (i + 1, j),
            (i, j + 1),
            (i, j - 1),
            (diag, j - 1),
            (diag, j + 1),
        ];

        candidates
            .into_iter()
            .filter(|&(ni, nj)| {
                ni >= 0 && nj >= 0 && ni < i64::from(self.width) && nj < i64::from(self.height)
            })
            .map(|(ni, nj)| TileCoord::new(ni as u32, nj as u32))
            .collect()
    }

    /// Cost for a unit to enter `tile`, or `None` if it cannot.
    ///
    /// Disabled tiles, Water and tiles without terrain are impassable to
    /// everyone; Forest uses the unit's own forest cost.
    #[must_use]
    pub fn move_weight(&self, tile: TileCoord, caps: &UnitCapabilities) -> Option<Fixed> {
        let info = self.tile(tile)?;
        if info.disabled {
            return None;
        }
        match info.tile_type {
            TileType::Forest => caps.forest_cost,
            other => other.base_cost(),
        }
    }

    /// World-space center of a tile.
    #[must_use]
    pub fn tile_center(&self, tile: TileCoord) -> Vec2Fixed {
        let x_stride = Fixed::from_num(X_STRIDE);
        let y_stride = Fixed::from_num(Y_STRIDE);
        let x_off = if tile.j % 2 == 1 {
            x_stride / 2
        } else {
            Fixed::ZERO
        };
        Vec2Fixed::new(
            x_off + Fixed::from_num(tile.i) * x_stride,
            Fixed::from_num(tile.j) * y_stride,
        )
    }

    /// Tile whose center is closest to a world position.
    ///
    /// Positions off the grid snap to the nearest edge tile.
    #[must_use]
    pub fn closest_tile(&self, position: Vec2Fixed) -> TileCoord {
        let x_stride = Fixed::from_num(X_STRIDE);
        let y_stride = Fixed::from_num(Y_STRIDE);
        let half_x = x_stride / 2;

        // Half-stride lattice cell containing the point. Two of its corners
        // are hex centers; pick the nearer one.
        let grid_i = (position.x * 2 / x_stride).to_num::<i64>();
        let grid_j = (position.y / y_stride).to_num::<i64>();

        let corner = |ci: i64, cj: i64| {
            Vec2Fixed::new(Fixed::from_num(ci) * half_x, Fixed::from_num(cj) * y_stride)
        };

        let (i, j) = if (grid_i + grid_j).rem_euclid(2) == 0 {
            let bottom_left = corner(grid_i, grid_j);
            let top_right = corner(grid_i + 1, grid_j + 1);
            if position.distance_squared(bottom_left) < position.distance_squared(top_right) {
                (grid_i.div_euclid(2), grid_j)
            } else {
                ((grid_i + 1).div_euclid(2), grid_j + 1)
            }
        } else {
            let top_left = corner(grid_i, grid_j + 1);
            let bottom_right = corner(grid_i + 1, grid_j);
            if position.distance_squared(top_left) < position.distance_squared(bottom_right) {
                (grid_i.div_euclid(2), grid_j + 1)
            } else {
                ((grid_i + 1).div_euclid(2), grid_j)
            }
        };

        TileCoord::new(
            i.clamp(0, i64::from(self.width) - 1) as u32,
            j.clamp(0, i64::from(self.height) - 1) as u32,
        )
    }

    // ------------------------------------------------------------------
    // Terrain
    // ------------------------------------------------------------------

    /// Change a tile's terrain type.
    pub fn set_tile_type(&mut self, tile: TileCoord, new_type: TileType) -> Result<()> {
        let info = self.tile_mut(tile)?;
        let from = info.tile_type;
        if from == new_type {
            return Ok(());
        }
        info.tile_type = new_type;
        self.events.push(GameEvent::TileTypeChanged {
            tile,
            from,
            to: new_type,
        });
        Ok(())
    }

    /// Cut a fireline on a tile.
    ///
    /// City becomes CityFireline; anything else becomes Fireline. Cutting
    /// through City or Forest consumes it for good and is counted. A tile
    /// that already is a fireline is left alone.
    pub fn dig_fireline(&mut self, tile: TileCoord) -> Result<()> {
        let current = self.tile_at(tile)?.tile_type;
        let new_type = match current {
            TileType::City => {
                self.counters.destroyed_cities += 1;
                TileType::CityFireline
            }
            TileType::Forest => {
                self.counters.destroyed_forests += 1;
                TileType::Fireline
            }
            TileType::Fireline | TileType::CityFireline => return Ok(()),
            _ => TileType::Fireline,
        };
        self.set_tile_type(tile, new_type)
    }

    // ------------------------------------------------------------------
    // Fire
    // ------------------------------------------------------------------

    /// Start a fire on a tile.
    pub fn ignite(&mut self, tile: TileCoord, life: u32) -> Result<()> {
        let info = self.tile_mut(tile)?;
        if info.disabled {
            return Err(GameError::TileDisabled(tile));
        }
        if info.fire.is_some() {
            return Err(GameError::AlreadyBurning(tile));
        }
        info.fire = Some(Fire { life });
        self.burning.push(tile);
        self.events.push(GameEvent::FireCreated { tile });
        tracing::debug!(%tile, life, "Fire created");
        Ok(())
    }

    /// Put out the fire on a tile, if any, leaving it Burnt.
    ///
    /// Returns `true` if a fire was put out.
    pub fn extinguish(&mut self, tile: TileCoord) -> Result<bool> {
        let info = self.tile_mut(tile)?;
        if info.fire.take().is_none() {
            return Ok(false);
        }
        match info.tile_type {
            TileType::City => self.counters.burnt_cities += 1,
            TileType::Forest => self.counters.burnt_forests += 1,
            _ => {}
        }
        self.burning.retain(|&t| t != tile);
        self.events.push(GameEvent::FireExtinguished { tile });
        self.set_tile_type(tile, TileType::Burnt)?;
        Ok(true)
    }

    /// Mutable access to the fire on a tile.
    pub(crate) fn fire_mut(&mut self, tile: TileCoord) -> Option<&mut Fire> {
        if !self.in_bounds(tile) {
            return None;
        }
        let index = self.index_of(tile);
        self.tiles[index].fire.as_mut()
    }

    /// Burning tiles in ignition order.
    #[must_use]
    pub fn burning(&self) -> &[TileCoord] {
        &self.burning
    }

    /// Check if a tile is burning.
    #[must_use]
    pub fn is_burning(&self, tile: TileCoord) -> bool {
        self.tile(tile).is_some_and(Tile::is_burning)
    }

    // ------------------------------------------------------------------
    // Units
    // ------------------------------------------------------------------

    /// Place a new unit on a tile.
    pub fn spawn_unit(&mut self, kind: UnitKind, tile: TileCoord, budget: Fixed) -> Result<UnitId> {
        let info = self.tile_at(tile)?;
        if info.disabled {
            return Err(GameError::TileDisabled(tile));
        }
        if info.unit.is_some() {
            return Err(GameError::TileOccupied(tile));
        }

        let id = self.next_unit_id;
        self.next_unit_id += 1;
        self.tile_mut(tile)?.unit = Some(id);
        self.units.insert(id, Unit::new(id, kind, tile, budget));
        self.events.push(GameEvent::UnitCreated { unit: id, kind, tile });
        tracing::debug!(unit = id, ?kind, %tile, "Unit created");
        Ok(id)
    }

    /// Move a unit to another tile.
    ///
    /// Moving onto the unit's own tile is a no-op.
    pub fn move_unit(&mut self, id: UnitId, to: TileCoord) -> Result<()> {
        let from = self.unit(id)?.tile;
        if from == to {
            return Ok(());
        }
        let target = self.tile_at(to)?;
        if target.disabled {
            return Err(GameError::TileDisabled(to));
        }
        if target.unit.is_some() {
            return Err(GameError::TileOccupied(to));
        }

        self.tile_mut(from)?.unit = None;
        self.tile_mut(to)?.unit = Some(id);
        if let Some(unit) = self.units.get_mut(&id) {
            unit.tile = to;
        }
        self.events.push(GameEvent::UnitMoved { unit: id, from, to });
        Ok(())
    }

    /// Remove a unit killed by fire.
    pub fn kill_unit(&mut self, id: UnitId) -> Result<Unit> {
        let tile = self.unit(id)?.tile;
        self.tile_mut(tile)?.unit = None;
        let unit = self.units.remove(&id).ok_or(GameError::UnknownUnit(id))?;
        self.counters.casualties += 1;
        self.events.push(GameEvent::UnitKilled { unit: id, tile });
        tracing::info!(unit = id, %tile, "Unit killed by fire");
        Ok(unit)
    }

    /// Look up a unit.
    pub fn unit(&self, id: UnitId) -> Result<&Unit> {
        self.units.get(&id).ok_or(GameError::UnknownUnit(id))
    }

    /// Look up a unit mutably.
    ///
    /// Position must only change through [`Grid::move_unit`].
    pub fn unit_mut(&mut self, id: UnitId) -> Result<&mut Unit> {
        self.units.get_mut(&id).ok_or(GameError::UnknownUnit(id))
    }

    /// Unit standing on a tile.
    #[must_use]
    pub fn unit_at(&self, tile: TileCoord) -> Option<&Unit> {
        self.tile(tile)
            .and_then(|t| t.unit)
            .and_then(|id| self.units.get(&id))
    }

    /// All units, ordered by ID.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Number of living units.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Unit IDs in the order of the grid slots they occupy (row-major).
    #[must_use]
    pub fn unit_ids_in_slot_order(&self) -> Vec<UnitId> {
        self.tiles.iter().filter_map(|t| t.unit).collect()
    }

    /// Reset every unit's remaining budget to its full range.
    pub(crate) fn refill_budgets(&mut self, budget_of: impl Fn(UnitKind) -> Fixed) {
        for unit in self.units.values_mut() {
            unit.remaining = budget_of(unit.kind);
        }
    }

    // ------------------------------------------------------------------
    // Camps
    // ------------------------------------------------------------------

    /// Place a camp on a City tile.
    pub fn place_camp(&mut self, tile: TileCoord) -> Result<()> {
        let info = self.tile_at(tile)?;
        if info.disabled {
            return Err(GameError::TileDisabled(tile));
        }
        if info.camp {
            return Err(GameError::CampExists(tile));
        }
        if info.tile_type != TileType::City || info.fire.is_some() {
            return Err(GameError::InvalidCampSite(tile));
        }
        self.tile_mut(tile)?.camp = true;
        self.camps.push(tile);
        self.events.push(GameEvent::CampCreated { tile });
        Ok(())
    }

    /// Remove a camp.
    pub fn destroy_camp(&mut self, tile: TileCoord) -> Result<()> {
        let info = self.tile_mut(tile)?;
        if !info.camp {
            return Err(GameError::NoCamp(tile));
        }
        info.camp = false;
        self.camps.retain(|&t| t != tile);
        self.events.push(GameEvent::CampDestroyed { tile });
        tracing::info!(%tile, "Camp destroyed");
        Ok(())
    }

    /// Camp tiles in placement order.
    #[must_use]
    pub fn camps(&self) -> &[TileCoord] {
        &self.camps
    }

    // ------------------------------------------------------------------
    // Bookkeeping
    // ------------------------------------------------------------------

    /// Damage totals so far.
    #[must_use]
    pub const fn counters(&self) -> &DamageCounters {
        &self.counters
    }

    /// Count tiles of a given type.
    #[must_use]
    pub fn count_type(&self, tile_type: TileType) -> usize {
        self.tiles
            .iter()
            .filter(|t| t.tile_type == tile_type)
            .count()
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Feed all gameplay state (not pending events) into a hasher.
    pub fn hash_state<H: Hasher>(&self, state: &mut H) {
        self.width.hash(state);
        self.height.hash(state);
        self.tiles.hash(state);
        self.units.hash(state);
        self.burning.hash(state);
        self.camps.hash(state);
        self.counters.hash(state);
    }
}
