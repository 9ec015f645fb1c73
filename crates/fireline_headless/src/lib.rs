//! Headless Fireline runner for scripted play and CI verification.
//!
//! This crate loads a scenario, hands its terrain to the simulation core
//! and drives the match from JSON commands on stdin, with responses on
//! stdout. This enables:
//!
//! - **Scripted play**: A controller can play the game without graphics
//! - **CI verification**: Automated checks of game rules and determinism
//! - **Balance runs**: Unattended games across many seeds
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from the controller (start, purchase, submit, etc.)
//! - **stdout**: State updates and responses (JSON)
//! - **stderr**: Debug logs (human-readable)
//!
//! See [`protocol`] module for the full command/response format.
//!
//! # Example
//!
//! ```bash
//! # Play level 1 interactively
//! echo '{"cmd":"start"}' | cargo run -p fireline_headless -- run --scenario level1
//!
//! # Play a scenario file with no orders
//! cargo run -p fireline_headless -- simulate --scenario scenarios/creek.ron
//!
//! # Verify determinism
//! cargo run -p fireline_headless -- verify --scenario level3 --runs 5
//! ```

pub mod batch;
pub mod protocol;
pub mod runner;
pub mod scenario;

pub use batch::{run_batch, BatchConfig, GameSummary};
pub use protocol::{Command, Response};
pub use runner::HeadlessRunner;
pub use scenario::{Level, Scenario, ScenarioError};
