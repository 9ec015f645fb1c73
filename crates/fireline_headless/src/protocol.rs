//! JSON protocol for headless game communication.
//!
//! The headless runner communicates via JSON lines (one JSON object per line):
//!
//! **Input (stdin):** Commands from the controller
//! **Output (stdout):** Game state updates and responses
//!
//! # Protocol Flow
//!
//! 1. Runner loads a scenario and outputs `{"type":"ready",...}` in setup
//! 2. The controller may place camps, then sends `start`
//! 3. Each turn: `purchase` and `submit` orders, then `end_turn`
//! 4. The runner answers `end_turn` with the turn's `events`
//! 5. Once nothing burns, it outputs `{"type":"game_over",...}`
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","scenario":"Level 1","turn":0,"phase":"setup"}
//! -> {"cmd":"start"}
//! <- {"type":"ack","cmd":"start"}
//! -> {"cmd":"purchase","i":4,"j":44,"unit_type":"digger"}
//! <- {"type":"ack","cmd":"purchase","unit":1}
//! -> {"cmd":"submit","unit":1,"order":"dig","i":6,"j":40}
//! <- {"type":"ack","cmd":"submit","outcome":"appended"}
//! -> {"cmd":"end_turn"}
//! <- {"type":"events","turn":1,"reports":[...],"ignited":[...],...}
//! ```

use fireline_core::prelude::*;
use std::result::Result;
use serde::{Deserialize, Serialize};

// ============================================================================
// Input Commands (Controller -> Runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Report the full match state.
    Query,

    /// Report one tile.
    Tile { i: u32, j: u32 },

    /// Find the tile nearest a world position.
    Closest { x: f64, y: f64 },

    /// List the tiles a unit can still reach this turn.
    Reachable { unit: UnitId },

    /// Queue, toggle or re-route an order.
    Submit {
        unit: UnitId,
        order: Order,
        i: u32,
        j: u32,
    },

    /// Drop every order of a unit.
    Clear { unit: UnitId },

    /// Place a camp (setup only).
    PlaceCamp { i: u32, j: u32 },

    /// Leave setup and begin the first turn.
    Start,

    /// Buy a unit at a camp.
    Purchase { i: u32, j: u32, unit_type: UnitType },

    /// End the player phase and resolve the turn.
    EndTurn,

    /// Report the state hash (for determinism verification).
    Hash,

    /// Quit the runner.
    Quit,
}

/// Order kinds as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    /// Walk to a tile.
    Move,
    /// Cut a fireline on a tile.
    Dig,
    /// Put out a tile's fire.
    Extinguish,
}

impl Order {
    /// Core command for this order at a target tile.
    #[must_use]
    pub const fn to_command(self, target: TileCoord) -> fireline_core::components::Command {
        use fireline_core::components::Command as CoreCommand;
        match self {
            Self::Move => CoreCommand::move_to(target),
            Self::Dig => CoreCommand::dig(target),
            Self::Extinguish => CoreCommand::extinguish(target),
        }
    }
}

/// Unit kinds as named on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    /// Hand crew.
    Digger,
    /// Fire engine.
    Truck,
}

impl From<UnitType> for UnitKind {
    fn from(unit_type: UnitType) -> Self {
        match unit_type {
            UnitType::Digger => Self::Digger,
            UnitType::Truck => Self::Truck,
        }
    }
}

impl From<UnitKind> for UnitType {
    fn from(kind: UnitKind) -> Self {
        match kind {
            UnitKind::Digger => Self::Digger,
            UnitKind::Truck => Self::Truck,
        }
    }
}

// ============================================================================
// Output Responses (Runner -> Controller)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready {
        version: String,
        scenario: String,
        turn: u32,
        phase: TurnPhase,
    },

    /// Acknowledgment of a command.
    Ack {
        cmd: String,
        /// Unit bought by a purchase.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<UnitId>,
        /// Effect of a submitted order.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outcome: Option<SubmitOutcome>,
    },

    /// Error processing a command.
    Error {
        message: String,
        cmd: Option<String>,
    },

    /// Current match state.
    State {
        turn: u32,
        phase: TurnPhase,
        treasury: Treasury,
        units: Vec<UnitState>,
        fires: Vec<FireState>,
        camps: Vec<TileCoord>,
        hash: u64,
    },

    /// One tile.
    Tile(TileState),

    /// Tiles a unit can reach.
    Reachable {
        unit: UnitId,
        tiles: Vec<ReachableTile>,
    },

    /// What happened while a turn resolved.
    Events {
        turn: u32,
        reports: Vec<ExecutionReport>,
        burnt_out: Vec<TileCoord>,
        ignited: Vec<TileCoord>,
        events: Vec<GameEvent>,
    },

    /// Nothing is burning any more.
    GameOver { stats: FinalStats },

    /// State hash for determinism verification.
    Hash { turn: u32, hash: u64 },
}

// ============================================================================
// State Types
// ============================================================================

/// State of a single unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitState {
    pub id: UnitId,
    pub unit_type: UnitType,
    pub tile: TileCoord,
    /// Action points left this turn.
    pub remaining: f64,
    /// Queued orders, in execution order.
    pub orders: Vec<QueuedOrder>,
    /// Whether the plan hits an unreachable target.
    pub blocked: bool,
}

/// One queued order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QueuedOrder {
    pub order: Order,
    pub target: TileCoord,
}

/// A burning tile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FireState {
    pub tile: TileCoord,
    pub life: u32,
}

/// State of one tile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileState {
    pub tile: TileCoord,
    pub tile_type: TileType,
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fire_life: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitId>,
    pub camp: bool,
}

/// A reachable tile and its distance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReachableTile {
    pub tile: TileCoord,
    pub dist: f64,
}

// ============================================================================
// Helpers
// ============================================================================

impl Response {
    /// Create a ready response.
    pub fn ready(scenario: &str, turn: u32, phase: TurnPhase) -> Self {
        Self::Ready {
            version: "1.0".to_string(),
            scenario: scenario.to_string(),
            turn,
            phase,
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
            unit: None,
            outcome: None,
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"type":"error","message":"Serialization failed: {}"}}"#,
                e
            )
        });
        json.push('\n');
        json
    }
}

impl UnitState {
    /// Snapshot a core unit.
    pub fn from_unit(unit: &Unit) -> Self {
        Self {
            id: unit.id,
            unit_type: unit.kind.into(),
            tile: unit.tile,
            remaining: unit.remaining.to_num::<f64>(),
            orders: unit
                .commands
                .iter()
                .map(|command| QueuedOrder {
                    order: match command.kind {
                        CommandKind::Move => Order::Move,
                        CommandKind::Dig => Order::Dig,
                        CommandKind::Extinguish => Order::Extinguish,
                    },
                    target: command.target,
                })
                .collect(),
            blocked: unit.has_invalid_step(),
        }
    }
}

impl TileState {
    /// Snapshot a core tile.
    pub fn from_tile(coord: TileCoord, tile: &Tile) -> Self {
        Self {
            tile: coord,
            tile_type: tile.tile_type,
            disabled: tile.disabled,
            fire_life: tile.fire.map(|fire| fire.life),
            unit: tile.unit,
            camp: tile.camp,
        }
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Tile { .. } => "tile",
            Self::Closest { .. } => "closest",
            Self::Reachable { .. } => "reachable",
            Self::Submit { .. } => "submit",
            Self::Clear { .. } => "clear",
            Self::PlaceCamp { .. } => "place_camp",
            Self::Start => "start",
            Self::Purchase { .. } => "purchase",
            Self::EndTurn => "end_turn",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submit_command() {
        let json = r#"{"cmd":"submit","unit":3,"order":"dig","i":4,"j":7}"#;
        let cmd = Command::from_json(json).unwrap();
        assert!(matches!(
            cmd,
            Command::Submit {
                unit: 3,
                order: Order::Dig,
                i: 4,
                j: 7
            }
        ));
        assert_eq!(cmd.name(), "submit");
    }

    #[test]
    fn test_parse_purchase_command() {
        let json = r#"{"cmd":"purchase","i":1,"j":2,"unit_type":"truck"}"#;
        let cmd = Command::from_json(json).unwrap();
        assert!(matches!(
            cmd,
            Command::Purchase {
                unit_type: UnitType::Truck,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_unit_commands() {
        assert!(matches!(
            Command::from_json(r#"{"cmd":"end_turn"}"#).unwrap(),
            Command::EndTurn
        ));
        assert!(matches!(
            Command::from_json(r#"{"cmd":"place_camp","i":0,"j":5}"#).unwrap(),
            Command::PlaceCamp { i: 0, j: 5 }
        ));
        assert!(Command::from_json(r#"{"cmd":"teleport"}"#).is_err());
    }

    #[test]
    fn test_order_to_command() {
        let target = TileCoord::new(2, 3);
        let command = Order::Extinguish.to_command(target);
        assert_eq!(command.kind, CommandKind::Extinguish);
        assert_eq!(command.target, target);
    }

    #[test]
    fn test_serialize_ack_omits_empty_fields() {
        let json = Response::ack("start").to_json_line();
        assert_eq!(json, "{\"type\":\"ack\",\"cmd\":\"start\"}\n");

        let json = Response::Ack {
            cmd: "submit".to_string(),
            unit: None,
            outcome: Some(SubmitOutcome::Rerouted),
        }
        .to_json_line();
        assert!(json.contains(r#""outcome":"rerouted""#));
    }

    #[test]
    fn test_serialize_state_response() {
        let resp = Response::State {
            turn: 3,
            phase: TurnPhase::Player,
            treasury: Treasury::new(500),
            units: vec![],
            fires: vec![FireState {
                tile: TileCoord::new(1, 1),
                life: 2,
            }],
            camps: vec![],
            hash: 12345,
        };
        let json = resp.to_json_line();
        assert!(json.contains(r#""type":"state""#));
        assert!(json.contains(r#""phase":"player""#));
        assert!(json.contains(r#""tile":{"i":1,"j":1}"#));
    }

    #[test]
    fn test_serialize_tile_response() {
        let tile = Tile {
            tile_type: TileType::Forest,
            fire: Some(Fire { life: 3 }),
            ..Tile::default()
        };
        let json = Response::Tile(TileState::from_tile(TileCoord::new(0, 0), &tile)).to_json_line();
        assert!(json.contains(r#""type":"tile""#));
        assert!(json.contains(r#""tile_type":"Forest""#));
        assert!(json.contains(r#""fire_life":3"#));
        assert!(!json.contains("\"unit\""));
    }
}
