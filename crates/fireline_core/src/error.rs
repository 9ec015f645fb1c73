//! Error types for the game simulation.
//!
//! Everything here is a programmer or caller error. Unreachable
//! destinations, budget exhaustion and failed spread rolls are ordinary
//! game outcomes and never surface as a [`GameError`].

use thiserror::Error;

use crate::grid::TileCoord;
use crate::simulation::TurnPhase;
use crate::unit_kind::UnitKind;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Tile coordinates outside the grid.
    #[error("Tile {tile} is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Offending coordinates.
        tile: TileCoord,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },

    /// Tile lies outside the playable sub-rectangle.
    #[error("Tile {0} is disabled")]
    TileDisabled(TileCoord),

    /// A second unit was placed on an occupied tile.
    #[error("Tile {0} already holds a unit")]
    TileOccupied(TileCoord),

    /// A second fire was created on a burning tile.
    #[error("Tile {0} is already burning")]
    AlreadyBurning(TileCoord),

    /// A second camp was placed on a tile.
    #[error("Tile {0} already holds a camp")]
    CampExists(TileCoord),

    /// Camps may only be placed on City tiles.
    #[error("Tile {0} cannot host a camp")]
    InvalidCampSite(TileCoord),

    /// No camp at the given tile.
    #[error("No camp at tile {0}")]
    NoCamp(TileCoord),

    /// Expected a unit on a tile that has none.
    #[error("No unit at tile {0}")]
    NoUnit(TileCoord),

    /// Invalid unit identifier.
    #[error("Unknown unit ID: {0}")]
    UnknownUnit(u32),

    /// The unit kind cannot perform the requested command.
    #[error("{kind:?} cannot {action}")]
    IllegalCommand {
        /// Kind of the commanded unit.
        kind: UnitKind,
        /// Human-readable action name.
        action: &'static str,
    },

    /// The operation is not available in the current phase.
    #[error("Operation '{operation}' not allowed during {phase:?}")]
    WrongPhase {
        /// Operation that was attempted.
        operation: &'static str,
        /// Current phase.
        phase: TurnPhase,
    },

    /// Insufficient treasury for a purchase.
    #[error("Insufficient funds: need {required}, have {available}")]
    InsufficientFunds {
        /// Amount required.
        required: u32,
        /// Amount available.
        available: u32,
    },

    /// Camp limit reached during setup.
    #[error("Camp limit of {0} reached")]
    CampLimit(u32),

    /// Terrain supplied by the caller does not match the declared size.
    #[error("Terrain has {actual} tiles, expected {expected}")]
    TerrainSizeMismatch {
        /// Tiles expected from width x height.
        expected: usize,
        /// Tiles actually supplied.
        actual: usize,
    },

    /// Rules data failed validation.
    #[error("Invalid rules: {0}")]
    InvalidRules(String),
}
