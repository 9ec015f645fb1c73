//! Outbound notifications for the presentation layer.
//!
//! The grid and the simulation push events as they mutate state; the
//! caller drains them in emission order after each operation.

use serde::{Deserialize, Serialize};

use crate::components::UnitId;
use crate::grid::{TileCoord, TileType};
use crate::simulation::{FinalStats, TurnPhase};
use crate::unit_kind::UnitKind;

/// Something the presentation layer may want to react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// A fire started on a tile.
    FireCreated {
        /// Burning tile.
        tile: TileCoord,
    },
    /// A fire went out, on its own or by extinguishing.
    FireExtinguished {
        /// Tile that stopped burning.
        tile: TileCoord,
    },
    /// A tile changed type.
    TileTypeChanged {
        /// Changed tile.
        tile: TileCoord,
        /// Previous type.
        from: TileType,
        /// New type.
        to: TileType,
    },
    /// A unit was purchased or spawned.
    UnitCreated {
        /// New unit.
        unit: UnitId,
        /// Unit kind.
        kind: UnitKind,
        /// Spawn tile.
        tile: TileCoord,
    },
    /// A unit changed tiles.
    UnitMoved {
        /// Moved unit.
        unit: UnitId,
        /// Previous tile.
        from: TileCoord,
        /// New tile.
        to: TileCoord,
    },
    /// A unit was killed by fire.
    UnitKilled {
        /// Dead unit.
        unit: UnitId,
        /// Tile where it died.
        tile: TileCoord,
    },
    /// A camp was placed.
    CampCreated {
        /// Camp tile.
        tile: TileCoord,
    },
    /// A camp burned down.
    CampDestroyed {
        /// Camp tile.
        tile: TileCoord,
    },
    /// The turn phase changed.
    PhaseChanged {
        /// New phase.
        phase: TurnPhase,
    },
    /// No fire is left burning.
    GameOver {
        /// Final report.
        stats: FinalStats,
    },
}
