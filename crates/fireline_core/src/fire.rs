//! Fire aging and spreading.
//!
//! Fires burn for a fixed number of turns, then leave the tile Burnt.
//! Each turn every burning tile may ignite its neighbors; the random
//! stream is consumed once per eligible neighbor, in ignition order, so a
//! seeded run is reproducible.

use rand::Rng;

use crate::error::Result;
use crate::grid::{Grid, TileCoord};
use crate::rules::Rules;

/// Age every fire by one turn. Fires reaching zero life burn out.
///
/// Returns the tiles that burned out.
pub fn age_fire(grid: &mut Grid) -> Result<Vec<TileCoord>> {
    let burning = grid.burning().to_vec();
    let mut burnt_out = Vec::new();

    for tile in burning {
        let Some(fire) = grid.fire_mut(tile) else {
            continue;
        };
        fire.life = fire.life.saturating_sub(1);
        if fire.life == 0 {
            grid.extinguish(tile)?;
            burnt_out.push(tile);
        }
    }

    if !burnt_out.is_empty() {
        tracing::debug!(count = burnt_out.len(), "Fires burned out");
    }
    Ok(burnt_out)
}

/// Check if fire can spread onto a tile.
///
/// The tile must be enabled, not burning, of a flammable type, and not
/// held by a firebreak unit.
#[must_use]
pub fn can_ignite(grid: &Grid, tile: TileCoord, rules: &Rules) -> bool {
    let Some(info) = grid.tile(tile) else {
        return false;
    };
    if info.disabled || info.is_burning() || !info.tile_type.is_flammable() {
        return false;
    }
    !grid
        .unit_at(tile)
        .is_some_and(|unit| rules.units.get(unit.kind).firebreak)
}

/// Spread fire from every tile burning at the start of the pass.
///
/// Tiles ignited during the pass do not spread until the next one.
/// Afterwards every unit standing in fire dies and every camp in fire is
/// destroyed.
///
/// Returns the newly ignited tiles in ignition order.
pub fn spread_fire<R: Rng>(grid: &mut Grid, rules: &Rules, rng: &mut R) -> Result<Vec<TileCoord>> {
    let sources = grid.burning().to_vec();
    let mut ignited = Vec::new();

    for source in sources {
        for neighbor in grid.neighbors(source) {
            if !can_ignite(grid, neighbor, rules) {
                continue;
            }
            if rng.gen::<f64>() < rules.fire_spread_chance {
                grid.ignite(neighbor, rules.fire_life)?;
                ignited.push(neighbor);
            }
        }
    }

    let doomed: Vec<_> = grid
        .unit_ids_in_slot_order()
        .into_iter()
        .filter(|&id| grid.unit(id).is_ok_and(|u| grid.is_burning(u.tile)))
        .collect();
    for id in doomed {
        grid.kill_unit(id)?;
    }

    let lost_camps: Vec<_> = grid
        .camps()
        .iter()
        .copied()
        .filter(|&tile| grid.is_burning(tile))
        .collect();
    for tile in lost_camps {
        grid.destroy_camp(tile)?;
    }

    tracing::debug!(
        ignited = ignited.len(),
        burning = grid.burning().len(),
        "Fire spread"
    );
    Ok(ignited)
}
