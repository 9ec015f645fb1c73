//! Turn orchestration.
//!
//! A match runs through a setup phase (camps and starting fires), then
//! alternates between a player phase, where commands are issued and units
//! bought, and a resolution phase that plays the turn out:
//!
//! 1. Income is paid for every enabled, non-burning tile.
//! 2. Every unit executes its plan, one unit fully finishing before the
//!    next starts, in the order of the grid slots they occupy.
//! 3. Fires age, then spread.
//! 4. Every plan is recompiled against the new grid.
//! 5. The next turn's income is previewed.
//! 6. If nothing is burning the match is over; otherwise play returns to
//!    the player.
//!
//! # Determinism
//!
//! The only randomness is fire spread, drawn from a ChaCha stream seeded
//! at construction. Unit order, fire order and neighbor order are all
//! fixed, so the same seed and the same inputs replay the same match.
//!
//! # Example
//!
//! ```
//! use fireline_core::prelude::*;
//!
//! let grid = Grid::uniform(8, 8, TileType::Grassland).unwrap();
//! let mut sim = Simulation::new(grid, Rules::default(), 7, 500).unwrap();
//! sim.start_fire(TileCoord::new(4, 4)).unwrap();
//! sim.start().unwrap();
//!
//! sim.resolve_turn().unwrap();
//! assert_eq!(sim.turn(), 1);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::VecDeque;
use std::hash::{Hash, Hasher};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::compiler::{self, SubmitOutcome};
use crate::components::{Command, UnitId};
use crate::economy::{turn_income, Treasury};
use crate::error::{GameError, Result};
use crate::events::GameEvent;
use crate::execution::{execute, ExecutionReport};
use crate::fire::{age_fire, spread_fire};
use crate::grid::{Grid, Tile, TileCoord, TileType};
use crate::math::{Fixed, Vec2Fixed};
use crate::pathfinding::{self, PathNode};
use crate::rules::Rules;
use crate::unit_kind::UnitKind;

/// Where the match is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// Before the first turn: camps and starting fires are placed.
    Setup,
    /// The player issues commands and buys units.
    Player,
    /// The turn is being played out.
    Resolving,
    /// No fire is left burning.
    GameOver,
}

/// End-of-match report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FinalStats {
    /// Turns played.
    pub turns: u32,
    /// Homes lost to fire.
    pub homes_burnt: u32,
    /// Homes torn down for firelines.
    pub homes_destroyed: u32,
    /// Forest acres lost to fire.
    pub forest_acres_burnt: u32,
    /// Forest acres cut for firelines.
    pub forest_acres_destroyed: u32,
    /// Crew killed.
    pub casualties: u32,
    /// Money spent on units.
    pub money_spent: u32,
}

/// One step of turn resolution, as returned by [`Simulation::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionStep {
    /// A unit played out its plan.
    Unit(ExecutionReport),
    /// Fires aged and spread; the turn is over.
    Fire {
        /// Tiles whose fire burned out.
        burnt_out: Vec<TileCoord>,
        /// Tiles that caught fire.
        ignited: Vec<TileCoord>,
    },
}

/// The match: grid, rules, money and the turn state machine.
#[derive(Debug, Clone)]
pub struct Simulation {
    grid: Grid,
    rules: Rules,
    rng: ChaCha8Rng,
    phase: TurnPhase,
    /// Units still to execute this resolution.
    pending: VecDeque<UnitId>,
    treasury: Treasury,
    turn: u32,
    final_stats: Option<FinalStats>,
}

impl Simulation {
    /// Create a match in the setup phase.
    pub fn new(grid: Grid, rules: Rules, seed: u64, money: u32) -> Result<Self> {
        rules.validate()?;
        let mut treasury = Treasury::new(money);
        treasury.income_preview = turn_income(&grid, &rules.profits);

        Ok(Self {
            grid,
            rules,
            rng: ChaCha8Rng::seed_from_u64(seed),
            phase: TurnPhase::Setup,
            pending: VecDeque::new(),
            treasury,
            turn: 0,
            final_stats: None,
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// The grid.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The rules in force.
    #[must_use]
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Check if a resolution is in progress.
    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        matches!(self.phase, TurnPhase::Resolving)
    }

    /// Turns fully resolved so far.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Money, spending and income preview.
    #[must_use]
    pub const fn treasury(&self) -> &Treasury {
        &self.treasury
    }

    /// Final report, once the match is over.
    #[must_use]
    pub const fn final_stats(&self) -> Option<&FinalStats> {
        self.final_stats.as_ref()
    }

    /// Tile at coordinates.
    pub fn tile(&self, tile: TileCoord) -> Result<&Tile> {
        self.grid.tile_at(tile)
    }

    /// Tile nearest a world position.
    #[must_use]
    pub fn closest_tile(&self, position: Vec2Fixed) -> TileCoord {
        self.grid.closest_tile(position)
    }

    /// Tiles a unit can still reach this turn, with their distances.
    pub fn reachable_tiles(&self, id: UnitId) -> Result<Vec<PathNode>> {
        let unit = self.grid.unit(id)?;
        Ok(pathfinding::reachable_tiles(
            &self.grid,
            unit.tile,
            unit.remaining,
            self.rules.units.get(unit.kind),
        ))
    }

    /// Tiles reachable from any tile for a unit kind.
    pub fn reachable_from(
        &self,
        start: TileCoord,
        max_dist: Fixed,
        kind: UnitKind,
    ) -> Result<Vec<PathNode>> {
        self.grid.validate(start)?;
        Ok(pathfinding::reachable_tiles(
            &self.grid,
            start,
            max_dist,
            self.rules.units.get(kind),
        ))
    }

    /// Take all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.grid.drain_events()
    }

    /// Hash of the full match state.
    ///
    /// Two matches with identical state produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.turn.hash(&mut hasher);
        self.phase.hash(&mut hasher);
        self.treasury.hash(&mut hasher);
        self.grid.hash_state(&mut hasher);
        hasher.finish()
    }

    fn require_phase(&self, operation: &'static str, phase: TurnPhase) -> Result<()> {
        if self.phase == phase {
            Ok(())
        } else {
            tracing::warn!(operation, phase = ?self.phase, "Operation rejected in this phase");
            Err(GameError::WrongPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    // ------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------

    /// Light a starting fire.
    pub fn start_fire(&mut self, tile: TileCoord) -> Result<()> {
        self.require_phase("start_fire", TurnPhase::Setup)?;
        self.grid.ignite(tile, self.rules.fire_life)?;
        self.treasury.income_preview = turn_income(&self.grid, &self.rules.profits);
        Ok(())
    }

    /// Place a camp on a City tile.
    pub fn place_camp(&mut self, tile: TileCoord) -> Result<()> {
        self.require_phase("place_camp", TurnPhase::Setup)?;
        let placed = self.grid.camps().len();
        if placed >= self.rules.max_camps as usize {
            return Err(GameError::CampLimit(self.rules.max_camps));
        }
        self.grid.place_camp(tile)?;
        tracing::info!(%tile, "Camp placed");
        Ok(())
    }

    /// Leave setup and begin the first player phase.
    ///
    /// A match that starts with nothing burning is over immediately.
    pub fn start(&mut self) -> Result<()> {
        self.require_phase("start", TurnPhase::Setup)?;
        if self.grid.burning().is_empty() {
            self.finish();
        } else {
            self.begin_player_phase();
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Player phase
    // ------------------------------------------------------------------

    /// Buy a unit and station it on a camp.
    pub fn purchase_unit(&mut self, camp: TileCoord, kind: UnitKind) -> Result<UnitId> {
        self.require_phase("purchase_unit", TurnPhase::Player)?;
        let tile = self.grid.tile_at(camp)?;
        if !tile.camp {
            return Err(GameError::NoCamp(camp));
        }
        if tile.unit.is_some() {
            return Err(GameError::TileOccupied(camp));
        }

        let caps = self.rules.units.get(kind);
        if !self.treasury.can_afford(caps.cost) {
            tracing::warn!(?kind, cost = caps.cost, balance = self.treasury.balance, "Purchase refused");
            return Err(GameError::InsufficientFunds {
                required: caps.cost,
                available: self.treasury.balance,
            });
        }

        let id = self.grid.spawn_unit(kind, camp, caps.budget())?;
        self.treasury.spend(caps.cost)?;
        tracing::info!(unit = id, ?kind, %camp, cost = caps.cost, "Unit purchased");
        Ok(id)
    }

    /// Queue, toggle or re-route a unit command.
    pub fn submit_command(&mut self, id: UnitId, command: Command) -> Result<SubmitOutcome> {
        self.require_phase("submit_command", TurnPhase::Player)?;
        compiler::submit_command(&mut self.grid, id, command, &self.rules)
    }

    /// Drop all of a unit's commands.
    pub fn clear_commands(&mut self, id: UnitId) -> Result<()> {
        self.require_phase("clear_commands", TurnPhase::Player)?;
        compiler::clear_commands(&mut self.grid, id, &self.rules)
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// End the player phase and begin resolving the turn.
    ///
    /// Returns `false` without doing anything outside the player phase,
    /// including while a resolution is already running.
    pub fn end_turn(&mut self) -> bool {
        if self.phase != TurnPhase::Player {
            tracing::debug!(phase = ?self.phase, "Ignoring end of turn");
            return false;
        }

        let income = turn_income(&self.grid, &self.rules.profits);
        self.treasury.deposit(income);
        self.pending = self.grid.unit_ids_in_slot_order().into();
        self.set_phase(TurnPhase::Resolving);
        tracing::info!(turn = self.turn, income, units = self.pending.len(), "Resolving turn");
        true
    }

    /// Perform the next resolution step.
    ///
    /// Executes the next unit, or once every unit is done runs the fire
    /// pass and closes the turn. Returns `None` when no resolution is in
    /// progress.
    pub fn advance(&mut self) -> Result<Option<ResolutionStep>> {
        if self.phase != TurnPhase::Resolving {
            return Ok(None);
        }

        while let Some(id) = self.pending.pop_front() {
            if self.grid.unit(id).is_err() {
                continue;
            }
            compiler::recompile(&mut self.grid, id, &self.rules)?;
            let report = execute(&mut self.grid, id, &self.rules)?;
            return Ok(Some(ResolutionStep::Unit(report)));
        }

        let burnt_out = age_fire(&mut self.grid)?;
        let ignited = spread_fire(&mut self.grid, &self.rules, &mut self.rng)?;
        compiler::recompile_all(&mut self.grid, &self.rules)?;
        self.treasury.income_preview = turn_income(&self.grid, &self.rules.profits);
        self.turn += 1;

        if self.grid.burning().is_empty() {
            self.finish();
        } else {
            self.begin_player_phase();
        }

        if cfg!(debug_assertions) {
            tracing::debug!(turn = self.turn, state_hash = self.state_hash(), "Turn resolved");
        }

        Ok(Some(ResolutionStep::Fire { burnt_out, ignited }))
    }

    /// End the player phase if needed and resolve the whole turn.
    ///
    /// Returns every resolution step taken. Does nothing outside the
    /// player and resolving phases.
    pub fn resolve_turn(&mut self) -> Result<Vec<ResolutionStep>> {
        self.end_turn();
        let mut steps = Vec::new();
        while let Some(step) = self.advance()? {
            steps.push(step);
        }
        Ok(steps)
    }

    fn begin_player_phase(&mut self) {
        let units = &self.rules.units;
        self.grid.refill_budgets(|kind| units.get(kind).budget());
        self.set_phase(TurnPhase::Player);
    }

    fn finish(&mut self) {
        let stats = self.compute_final_stats();
        self.final_stats = Some(stats);
        self.set_phase(TurnPhase::GameOver);
        self.grid.push_event(GameEvent::GameOver { stats });
        tracing::info!(?stats, "Game over");
    }

    fn set_phase(&mut self, phase: TurnPhase) {
        self.phase = phase;
        self.grid.push_event(GameEvent::PhaseChanged { phase });
        tracing::info!(?phase, turn = self.turn, "Phase changed");
    }

    fn compute_final_stats(&self) -> FinalStats {
        let counters = self.grid.counters();
        let stats = &self.rules.stats;
        let city_firelines = u32::try_from(self.grid.count_type(TileType::CityFireline))
            .unwrap_or(u32::MAX);

        FinalStats {
            turns: self.turn,
            homes_burnt: counters.burnt_cities.saturating_mul(stats.homes_per_city_tile),
            homes_destroyed: city_firelines.saturating_mul(stats.homes_per_city_tile),
            forest_acres_burnt: counters
                .burnt_forests
                .saturating_mul(stats.acres_per_forest_tile),
            forest_acres_destroyed: counters
                .destroyed_forests
                .saturating_mul(stats.acres_per_forest_tile),
            casualties: counters.casualties.saturating_mul(stats.crew_per_unit),
            money_spent: self.treasury.spent,
        }
    }
}
