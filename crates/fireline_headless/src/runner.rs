//! Headless game runner implementation.

use std::io::{self, BufRead, Write};

use fireline_core::prelude::*;
use std::result::Result;

use crate::protocol::{Command, FireState, ReachableTile, Response, TileState, UnitState};
use crate::scenario::{Scenario, ScenarioError};

/// Headless runner configuration.
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    /// Output state after every resolved turn (vs only on query).
    pub auto_state_output: bool,
}

/// Headless runner for controller-driven play.
pub struct HeadlessRunner {
    config: HeadlessConfig,
    scenario_name: String,
    sim: Simulation,
}

impl HeadlessRunner {
    /// Create a runner for a scenario with default config.
    pub fn new(scenario: &Scenario) -> Result<Self, ScenarioError> {
        Self::with_config(scenario, HeadlessConfig::default())
    }

    /// Create a runner with custom configuration.
    pub fn with_config(scenario: &Scenario, config: HeadlessConfig) -> Result<Self, ScenarioError> {
        Ok(Self {
            config,
            scenario_name: scenario.name.clone(),
            sim: scenario.build_simulation()?,
        })
    }

    /// The match being played.
    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Run against stdin and stdout until `quit` or end of input.
    pub fn run_stdio(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run(stdin.lock(), stdout.lock())
    }

    /// Run the command loop.
    ///
    /// Reads one JSON command per line and writes one JSON response per
    /// line. Malformed lines are answered with an error and skipped.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        let ready = Response::ready(&self.scenario_name, self.sim.turn(), self.sim.phase());
        output.write_all(ready.to_json_line().as_bytes())?;
        output.flush()?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let cmd = match Command::from_json(line) {
                Ok(cmd) => cmd,
                Err(e) => {
                    let error = Response::error(format!("Parse error: {e}"), None);
                    output.write_all(error.to_json_line().as_bytes())?;
                    output.flush()?;
                    continue;
                }
            };

            let quit = matches!(cmd, Command::Quit);
            for response in self.handle(cmd) {
                output.write_all(response.to_json_line().as_bytes())?;
            }
            output.flush()?;
            if quit {
                tracing::info!("Quit requested");
                break;
            }
        }
        Ok(())
    }

    /// Apply one command and collect its responses.
    pub fn handle(&mut self, cmd: Command) -> Vec<Response> {
        let cmd_name = cmd.name();
        tracing::debug!(cmd = cmd_name, "Handling command");

        let result = match cmd {
            Command::Query => Ok(vec![self.state()]),

            Command::Hash => Ok(vec![Response::Hash {
                turn: self.sim.turn(),
                hash: self.sim.state_hash(),
            }]),

            Command::Tile { i, j } => {
                let coord = TileCoord::new(i, j);
                self.sim
                    .tile(coord)
                    .map(|tile| vec![Response::Tile(TileState::from_tile(coord, tile))])
            }

            Command::Closest { x, y } => {
                match (Fixed::checked_from_num(x), Fixed::checked_from_num(y)) {
                    (Some(x), Some(y)) => {
                        let coord = self.sim.closest_tile(Vec2Fixed::new(x, y));
                        self.sim
                            .tile(coord)
                            .map(|tile| vec![Response::Tile(TileState::from_tile(coord, tile))])
                    }
                    _ => {
                        return vec![Response::error(
                            format!("Position ({x}, {y}) is not representable"),
                            Some(cmd_name),
                        )]
                    }
                }
            }

            Command::Reachable { unit } => self.sim.reachable_tiles(unit).map(|nodes| {
                vec![Response::Reachable {
                    unit,
                    tiles: nodes
                        .into_iter()
                        .map(|node| ReachableTile {
                            tile: node.tile,
                            dist: node.dist.to_num::<f64>(),
                        })
                        .collect(),
                }]
            }),

            Command::Submit { unit, order, i, j } => self
                .sim
                .submit_command(unit, order.to_command(TileCoord::new(i, j)))
                .map(|outcome| {
                    vec![Response::Ack {
                        cmd: cmd_name.to_string(),
                        unit: None,
                        outcome: Some(outcome),
                    }]
                }),

            Command::Clear { unit } => self
                .sim
                .clear_commands(unit)
                .map(|()| vec![Response::ack(cmd_name)]),

            Command::PlaceCamp { i, j } => self
                .sim
                .place_camp(TileCoord::new(i, j))
                .map(|()| vec![Response::ack(cmd_name)]),

            Command::Start => self.sim.start().map(|()| {
                let mut responses = vec![Response::ack(cmd_name)];
                responses.extend(self.game_over());
                responses
            }),

            Command::Purchase { i, j, unit_type } => self
                .sim
                .purchase_unit(TileCoord::new(i, j), unit_type.into())
                .map(|id| {
                    vec![Response::Ack {
                        cmd: cmd_name.to_string(),
                        unit: Some(id),
                        outcome: None,
                    }]
                }),

            Command::EndTurn => self.end_turn(),

            Command::Quit => Ok(vec![Response::ack(cmd_name)]),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(cmd = cmd_name, error = %e, "Command rejected");
            vec![Response::error(e.to_string(), Some(cmd_name))]
        })
    }

    /// Resolve the turn and report what happened.
    fn end_turn(&mut self) -> fireline_core::error::Result<Vec<Response>> {
        if !self.sim.end_turn() {
            return Ok(vec![Response::error(
                format!("Cannot end the turn during {:?}", self.sim.phase()),
                Some("end_turn"),
            )]);
        }

        let mut reports = Vec::new();
        let mut burnt_out = Vec::new();
        let mut ignited = Vec::new();
        for step in self.sim.resolve_turn()? {
            match step {
                ResolutionStep::Unit(report) => reports.push(report),
                ResolutionStep::Fire {
                    burnt_out: out,
                    ignited: lit,
                } => {
                    burnt_out = out;
                    ignited = lit;
                }
            }
        }

        let mut responses = vec![Response::Events {
            turn: self.sim.turn(),
            reports,
            burnt_out,
            ignited,
            events: self.sim.drain_events(),
        }];
        if self.config.auto_state_output {
            responses.push(self.state());
        }
        responses.extend(self.game_over());
        Ok(responses)
    }

    fn game_over(&self) -> Option<Response> {
        self.sim
            .final_stats()
            .map(|&stats| Response::GameOver { stats })
    }

    /// Build state response from current match state.
    fn state(&self) -> Response {
        let grid = self.sim.grid();
        let fires = grid
            .burning()
            .iter()
            .filter_map(|&tile| {
                grid.tile(tile)
                    .and_then(|t| t.fire)
                    .map(|fire| FireState {
                        tile,
                        life: fire.life,
                    })
            })
            .collect();

        Response::State {
            turn: self.sim.turn(),
            phase: self.sim.phase(),
            treasury: *self.sim.treasury(),
            units: grid.units().map(UnitState::from_unit).collect(),
            fires,
            camps: grid.camps().to_vec(),
            hash: self.sim.state_hash(),
        }
    }
}
