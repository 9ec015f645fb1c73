//! Unattended play for balance runs and determinism checks.
//!
//! A batch game never issues orders: it ends turns until the fire burns
//! itself out or the turn cap is reached. That makes it a measure of how
//! much a map loses with no intervention, and a cheap end-to-end
//! determinism probe.

use fireline_core::prelude::*;
use std::result::Result;
use serde::{Deserialize, Serialize};

use crate::scenario::{Scenario, ScenarioError};

/// Default turn cap for unattended games.
pub const DEFAULT_MAX_TURNS: u32 = 200;

/// Batch run configuration.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of games to run.
    pub game_count: u32,
    /// Seed of the first game; later games count up from it.
    pub seed_start: u64,
    /// Turn cap per game.
    pub max_turns: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            game_count: 1,
            seed_start: 0,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

/// Outcome of one unattended game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Scenario name.
    pub scenario: String,
    /// Fire spread seed.
    pub seed: u64,
    /// Turns resolved.
    pub turns: u32,
    /// Final report; `None` if the turn cap was hit first.
    pub stats: Option<FinalStats>,
    /// State hash after the last turn.
    pub final_hash: u64,
}

/// Play one game with no orders.
pub fn run_single_game(scenario: &Scenario, max_turns: u32) -> Result<GameSummary, ScenarioError> {
    let mut sim = scenario.build_simulation()?;
    sim.start()?;

    while sim.phase() != TurnPhase::GameOver && sim.turn() < max_turns {
        sim.resolve_turn()?;
    }

    if sim.final_stats().is_none() {
        tracing::warn!(
            scenario = %scenario.name,
            seed = scenario.seed,
            max_turns,
            "Turn cap reached with fire still burning"
        );
    }

    Ok(GameSummary {
        scenario: scenario.name.clone(),
        seed: scenario.seed,
        turns: sim.turn(),
        stats: sim.final_stats().copied(),
        final_hash: sim.state_hash(),
    })
}

/// Play `game_count` games on consecutive seeds.
pub fn run_batch(scenario: &Scenario, config: &BatchConfig) -> Result<Vec<GameSummary>, ScenarioError> {
    (0..u64::from(config.game_count))
        .map(|offset| -> Result<GameSummary, ScenarioError> {
            let seeded = scenario.clone().with_seed(config.seed_start.wrapping_add(offset));
            let summary = run_single_game(&seeded, config.max_turns)?;
            tracing::info!(
                seed = summary.seed,
                turns = summary.turns,
                hash = summary.final_hash,
                "Game complete"
            );
            Ok(summary)
        })
        .collect()
}

/// Verify determinism by running the same seed multiple times.
pub fn verify_determinism(scenario: &Scenario, runs: u32, max_turns: u32) -> Result<bool, ScenarioError> {
    let results = (0..runs)
        .map(|_| run_single_game(scenario, max_turns))
        .collect::<Result<Vec<_>, _>>()?;

    let Some(first) = results.first() else {
        return Ok(true);
    };
    Ok(results.iter().all(|r| r == first))
}
