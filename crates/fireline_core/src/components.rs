//! Plain data carried by the grid: units, their commands and compiled
//! steps, and fires.
//!
//! Components are pure data with no behavior. Compilation lives in
//! [`crate::compiler`], playback in [`crate::execution`].

use serde::{Deserialize, Serialize};

use crate::grid::TileCoord;
use crate::math::{fixed_serde, Cost, Fixed};
use crate::unit_kind::UnitKind;

/// Unique identifier for units.
pub type UnitId = u32;

/// What a player asked a unit to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    /// Walk to the target tile.
    Move,
    /// Walk to the target tile and cut a fireline there.
    Dig,
    /// Walk to the target tile and put out its fire.
    Extinguish,
}

/// Player intent: a command kind and its target tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    /// Kind of command.
    pub kind: CommandKind,
    /// Target tile.
    pub target: TileCoord,
}

impl Command {
    /// Create a move command.
    #[must_use]
    pub const fn move_to(target: TileCoord) -> Self {
        Self {
            kind: CommandKind::Move,
            target,
        }
    }

    /// Create a dig command.
    #[must_use]
    pub const fn dig(target: TileCoord) -> Self {
        Self {
            kind: CommandKind::Dig,
            target,
        }
    }

    /// Create an extinguish command.
    #[must_use]
    pub const fn extinguish(target: TileCoord) -> Self {
        Self {
            kind: CommandKind::Extinguish,
            target,
        }
    }
}

/// Kind of a compiled step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    /// Enter the target tile.
    Move,
    /// Cut a fireline on the target tile.
    Dig,
    /// Put out the fire on the target tile.
    Extinguish,
    /// The target could not be reached. Halts the unit.
    Invalid,
}

impl From<CommandKind> for StepKind {
    fn from(kind: CommandKind) -> Self {
        match kind {
            CommandKind::Move => Self::Move,
            CommandKind::Dig => Self::Dig,
            CommandKind::Extinguish => Self::Extinguish,
        }
    }
}

/// One compiled, cost-bearing atomic action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandStep {
    /// Kind of step.
    pub kind: StepKind,
    /// Tile the step acts on.
    pub target: TileCoord,
    /// Action points this step consumes.
    pub cost: Cost,
    /// Completion marker: zero cost, removes its originating command
    /// from the unit's list when execution reaches it.
    pub marker: bool,
}

impl CommandStep {
    /// Create a non-marker step.
    #[must_use]
    pub const fn new(kind: StepKind, target: TileCoord, cost: Cost) -> Self {
        Self {
            kind,
            target,
            cost,
            marker: false,
        }
    }

    /// Create the completion marker for a command.
    #[must_use]
    pub fn marker(command: Command) -> Self {
        Self {
            kind: command.kind.into(),
            target: command.target,
            cost: Cost::ZERO,
            marker: true,
        }
    }

    /// The command a marker step completes.
    ///
    /// Returns `None` for ordinary steps.
    #[must_use]
    pub const fn completed_command(&self) -> Option<Command> {
        if !self.marker {
            return None;
        }
        let kind = match self.kind {
            StepKind::Move => CommandKind::Move,
            StepKind::Dig => CommandKind::Dig,
            StepKind::Extinguish => CommandKind::Extinguish,
            StepKind::Invalid => return None,
        };
        Some(Command {
            kind,
            target: self.target,
        })
    }
}

/// A firefighting unit.
///
/// The grid's occupancy slot is the source of truth for where a unit is;
/// `tile` mirrors the last committed move.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: UnitId,
    /// Kind of unit.
    pub kind: UnitKind,
    /// Tile the unit currently occupies.
    pub tile: TileCoord,
    /// Action points left this turn.
    #[serde(with = "fixed_serde")]
    pub remaining: Fixed,
    /// Player-issued commands, in execution order.
    pub commands: Vec<Command>,
    /// Steps compiled from `commands`.
    pub steps: Vec<CommandStep>,
}

impl Unit {
    /// Create a unit with no orders.
    #[must_use]
    pub fn new(id: UnitId, kind: UnitKind, tile: TileCoord, budget: Fixed) -> Self {
        Self {
            id,
            kind,
            tile,
            remaining: budget,
            commands: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Check if the compiled plan contains an unreachable step.
    #[must_use]
    pub fn has_invalid_step(&self) -> bool {
        self.steps.iter().any(|s| s.kind == StepKind::Invalid)
    }
}

/// A fire burning on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fire {
    /// Turns left before the fire burns out.
    pub life: u32,
}
