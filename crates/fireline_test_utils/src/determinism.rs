//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a match produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! A seeded match must replay exactly. Sources of non-determinism include:
//!
//! - **Floating-point math**: costs and distances use fixed-point via
//!   [`fireline_core::math::Fixed`]; the only float is the spread
//!   probability, compared against a value drawn from the seeded stream.
//!
//! - **HashMap iteration order**: units live in a `BTreeMap` and execute
//!   in grid-slot order; fires are kept in ignition order.
//!
//! - **System randomness**: fire spread draws from a ChaCha stream seeded
//!   when the match is created.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use fireline_core::simulation::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of turns played per run.
    pub turns: u32,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Turns: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.turns,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `turns` - Number of steps per run
/// * `setup` - Function to create initial state
/// * `step` - Function to advance the state by one turn
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    turns: u32,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..turns {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        turns,
    }
}

/// Play a match `runs` times for up to `turns` turns each and compare
/// final state hashes.
///
/// Turns after the match is over are no-ops, so every run stops at the
/// same point.
pub fn verify_match_determinism<F>(setup_fn: F, runs: usize, turns: u32) -> DeterminismResult
where
    F: Fn() -> Simulation,
{
    verify_determinism(
        runs,
        turns,
        setup_fn,
        |sim: &mut Simulation| {
            if let Err(err) = sim.resolve_turn() {
                tracing::error!(%err, "Turn failed during determinism run");
            }
        },
        Simulation::state_hash,
    )
}

/// Find the first turn at which two runs of the same setup diverge.
///
/// # Returns
///
/// `None` if the runs are deterministic, `Some(turn)` if they diverge
/// after that turn (0 meaning the initial state already differs).
pub fn find_first_divergence<F>(setup_fn: F, turns: u32) -> Option<u32>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for turn in 1..=turns {
        let r1 = sim1.resolve_turn();
        let r2 = sim2.resolve_turn();

        if r1 != r2 || sim1.state_hash() != sim2.state_hash() {
            return Some(turn);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for maps and coordinates.
pub mod strategies {
    use fireline_core::grid::{Grid, TileCoord, TileType};
    use proptest::prelude::*;

    /// Any terrain type a map generator would produce.
    pub fn arb_tile_type() -> impl Strategy<Value = TileType> {
        prop_oneof![
            4 => Just(TileType::Grassland),
            3 => Just(TileType::Forest),
            1 => Just(TileType::Water),
            2 => Just(TileType::City),
            1 => Just(TileType::Fireline),
            1 => Just(TileType::Burnt),
        ]
    }

    /// A grid between 1x1 and `max_width` x `max_height` with random terrain.
    pub fn arb_grid(max_width: u32, max_height: u32) -> impl Strategy<Value = Grid> {
        (1..=max_width, 1..=max_height).prop_flat_map(|(width, height)| {
            proptest::collection::vec(arb_tile_type(), (width * height) as usize).prop_map(
                move |terrain| {
                    Grid::new(width, height, terrain).expect("generated terrain fits the grid")
                },
            )
        })
    }

    /// A grid together with one coordinate inside it.
    pub fn arb_grid_and_tile(
        max_width: u32,
        max_height: u32,
    ) -> impl Strategy<Value = (Grid, TileCoord)> {
        arb_grid(max_width, max_height).prop_flat_map(|grid| {
            let (w, h) = (grid.width(), grid.height());
            (Just(grid), 0..w, 0..h).prop_map(|(grid, i, j)| (grid, TileCoord::new(i, j)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{tile, MatchBuilder};

    fn forest_match() -> Simulation {
        MatchBuilder::new(&[
            "FFFFFFFF",
            "FF.FFFFF",
            "FFFFCCFF",
            "FFFFCCFF",
            "FFFFFFFF",
        ])
        .seed(99)
        .fire(tile(1, 1))
        .start()
    }

    #[test]
    fn test_seeded_match_is_deterministic() {
        verify_match_determinism(forest_match, 4, 6).assert_deterministic();
    }

    #[test]
    fn test_no_divergence() {
        assert_eq!(find_first_divergence(forest_match, 6), None);
    }

    #[test]
    fn test_generic_harness_compares_runs() {
        let result = verify_determinism(
            2,
            1,
            || 0u64,
            |n| *n += 1,
            |n| *n,
        );
        assert!(result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 1);
    }

    #[test]
    fn test_compute_hash_stable() {
        assert_eq!(compute_hash(&(1u32, 2u32)), compute_hash(&(1u32, 2u32)));
    }
}
