//! # Fireline Core
//!
//! Deterministic simulation core for Fireline, a turn-based wildfire
//! tactics game played on a hexagonal tile grid.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO
//! - No system randomness (fire spread draws from a seeded ChaCha stream)
//! - No floating-point math in the simulation (costs use fixed-point)
//!
//! ## Crate Structure
//!
//! - [`grid`] - Tile storage, hex adjacency, coordinate conversions
//! - [`pathfinding`] - Shortest paths and reachable sets over the tile graph
//! - [`compiler`] - Turns player commands into cost-bearing steps
//! - [`execution`] - Plays back one unit's compiled steps
//! - [`fire`] - Fire aging and probabilistic spread
//! - [`economy`] - Treasury and per-turn income
//! - [`simulation`] - Turn orchestration, economy and win detection

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod compiler;
pub mod components;
pub mod economy;
pub mod error;
pub mod events;
pub mod execution;
pub mod fire;
pub mod grid;
pub mod index_pq;
pub mod math;
pub mod pathfinding;
pub mod rules;
pub mod simulation;
pub mod unit_kind;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::compiler::SubmitOutcome;
    pub use crate::components::{
        Command, CommandKind, CommandStep, Fire, StepKind, Unit, UnitId,
    };
    pub use crate::economy::Treasury;
    pub use crate::error::{GameError, Result};
    pub use crate::events::GameEvent;
    pub use crate::execution::{ExecutionOutcome, ExecutionReport};
    pub use crate::grid::{DamageCounters, Grid, Tile, TileCoord, TileType};
    pub use crate::math::{Cost, Fixed, Vec2Fixed};
    pub use crate::pathfinding::PathNode;
    pub use crate::rules::Rules;
    pub use crate::simulation::{FinalStats, ResolutionStep, Simulation, TurnPhase};
    pub use crate::unit_kind::{UnitCapabilities, UnitKind};
}
