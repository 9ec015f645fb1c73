//! Command compilation: turn a unit's queued commands into cost-bearing
//! steps.
//!
//! Compilation is a pure function of the grid and the unit's command list.
//! It is re-run whenever the commands change and after every grid mutation
//! that can change path costs, so stale plans surface as
//! [`StepKind::Invalid`] steps instead of walking through blocked tiles.

use serde::{Deserialize, Serialize};

use crate::components::{Command, CommandKind, CommandStep, StepKind, Unit, UnitId};
use crate::error::{GameError, Result};
use crate::grid::{Grid, TileCoord};
use crate::math::{Cost, Fixed};
use crate::pathfinding::shortest_path;
use crate::rules::Rules;
use crate::unit_kind::UnitCapabilities;

/// How a submitted command changed the unit's command list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Appended to the end of the list.
    Appended,
    /// A command with the same target was already queued and was removed.
    Removed,
    /// A move onto an already-planned route: later commands were dropped
    /// and the move appended.
    Rerouted,
    /// Inserted before the command whose route passes over the target.
    Inserted,
}

/// Compile a unit's commands into steps against the current grid.
///
/// A cursor starts at the unit's tile and follows each command's target.
/// Every command ends with a zero-cost completion marker.
#[must_use]
pub fn compile(grid: &Grid, unit: &Unit, rules: &Rules) -> Vec<CommandStep> {
    let caps = rules.units.get(unit.kind);
    let mut steps = Vec::new();
    let mut cursor = unit.tile;

    for command in &unit.commands {
        match command.kind {
            CommandKind::Move => {
                push_route(grid, caps, cursor, command.target, &mut steps);
            }
            CommandKind::Dig => {
                push_route(grid, caps, cursor, command.target, &mut steps);
                steps.push(CommandStep::new(
                    StepKind::Dig,
                    command.target,
                    Cost::Finite(rules.dig_cost()),
                ));
            }
            CommandKind::Extinguish => {
                push_route(grid, caps, cursor, command.target, &mut steps);
                steps.push(CommandStep::new(
                    StepKind::Extinguish,
                    command.target,
                    Cost::Finite(rules.extinguish_cost()),
                ));
            }
        }
        steps.push(CommandStep::marker(*command));
        cursor = command.target;
    }

    steps
}

/// Append one Move step per hop from `from` to `to`, or a single Invalid
/// step if `to` cannot be reached.
fn push_route(
    grid: &Grid,
    caps: &UnitCapabilities,
    from: TileCoord,
    to: TileCoord,
    steps: &mut Vec<CommandStep>,
) {
    let Some(path) = shortest_path(grid, from, to, caps) else {
        steps.push(CommandStep::new(StepKind::Invalid, to, Cost::Infinite));
        return;
    };

    let mut travelled = Fixed::ZERO;
    for node in path {
        steps.push(CommandStep::new(
            StepKind::Move,
            node.tile,
            Cost::Finite(node.dist - travelled),
        ));
        travelled = node.dist;
    }
}

/// Rebuild a unit's steps from its command list.
pub fn recompile(grid: &mut Grid, id: UnitId, rules: &Rules) -> Result<()> {
    let steps = compile(grid, grid.unit(id)?, rules);
    let unit = grid.unit_mut(id)?;
    tracing::debug!(
        unit = id,
        commands = unit.commands.len(),
        steps = steps.len(),
        "Compiled commands"
    );
    unit.steps = steps;
    Ok(())
}

/// Rebuild every unit's steps.
pub fn recompile_all(grid: &mut Grid, rules: &Rules) -> Result<()> {
    let ids: Vec<UnitId> = grid.units().map(|u| u.id).collect();
    for id in ids {
        recompile(grid, id, rules)?;
    }
    Ok(())
}

/// Add or remove a command on a unit, then recompile.
///
/// * A command whose target matches a queued command removes that command.
/// * A move onto a tile the current plan already passes through drops
///   everything from that point and appends the move.
/// * Any other command onto such a tile is inserted before the command
///   whose route passes over it.
/// * Otherwise the command is appended.
pub fn submit_command(
    grid: &mut Grid,
    id: UnitId,
    command: Command,
    rules: &Rules,
) -> Result<SubmitOutcome> {
    let target = grid.tile_at(command.target)?;
    if target.disabled {
        return Err(GameError::TileDisabled(command.target));
    }

    let unit = grid.unit(id)?;
    let caps = rules.units.get(unit.kind);
    let illegal = match command.kind {
        CommandKind::Move => None,
        CommandKind::Dig => (!caps.can_dig).then_some("dig"),
        CommandKind::Extinguish => (!caps.can_extinguish).then_some("extinguish"),
    };
    if let Some(action) = illegal {
        tracing::warn!(unit = id, kind = ?unit.kind, action, "Rejected illegal command");
        return Err(GameError::IllegalCommand {
            kind: unit.kind,
            action,
        });
    }

    let unit = grid.unit_mut(id)?;
    let outcome = if let Some(pos) = unit
        .commands
        .iter()
        .rposition(|c| c.target == command.target)
    {
        unit.commands.remove(pos);
        SubmitOutcome::Removed
    } else {
        let before = commands_before(&unit.steps, command.target);
        if before == unit.commands.len() {
            unit.commands.push(command);
            SubmitOutcome::Appended
        } else if command.kind == CommandKind::Move {
            unit.commands.truncate(before);
            unit.commands.push(command);
            SubmitOutcome::Rerouted
        } else {
            unit.commands.insert(before, command);
            SubmitOutcome::Inserted
        }
    };

    tracing::debug!(unit = id, ?command, ?outcome, "Command submitted");
    recompile(grid, id, rules)?;
    Ok(outcome)
}

/// Number of commands whose steps finish before the plan first touches
/// `target`. Equals the command count if the plan never touches it.
fn commands_before(steps: &[CommandStep], target: TileCoord) -> usize {
    let mut completed = 0;
    for step in steps {
        if step.marker {
            completed += 1;
        } else if step.target == target {
            break;
        }
    }
    completed
}

/// Drop every queued command of a unit.
pub fn clear_commands(grid: &mut Grid, id: UnitId, rules: &Rules) -> Result<()> {
    grid.unit_mut(id)?.commands.clear();
    recompile(grid, id, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileType;
    use crate::unit_kind::UnitKind;

    fn coord(i: u32, j: u32) -> TileCoord {
        TileCoord::new(i, j)
    }

    fn setup(kind: UnitKind) -> (Grid, UnitId, Rules) {
        let rules = Rules::default();
        let mut grid = Grid::uniform(6, 1, TileType::Grassland).unwrap();
        let id = grid
            .spawn_unit(kind, coord(0, 0), rules.units.get(kind).budget())
            .unwrap();
        (grid, id, rules)
    }

    fn kinds(grid: &Grid, id: UnitId) -> Vec<(StepKind, TileCoord, bool)> {
        grid.unit(id)
            .unwrap()
            .steps
            .iter()
            .map(|s| (s.kind, s.target, s.marker))
            .collect()
    }

    #[test]
    fn test_move_compiles_to_hops_and_marker() {
        let (mut grid, id, rules) = setup(UnitKind::Digger);
        submit_command(&mut grid, id, Command::move_to(coord(2, 0)), &rules).unwrap();

        assert_eq!(
            kinds(&grid, id),
            vec![
                (StepKind::Move, coord(1, 0), false),
                (StepKind::Move, coord(2, 0), false),
                (StepKind::Move, coord(2, 0), true),
            ]
        );
        let steps = &grid.unit(id).unwrap().steps;
        assert_eq!(steps[0].cost, Cost::from_int(1));
        assert_eq!(steps[1].cost, Cost::from_int(1));
        assert_eq!(steps[2].cost, Cost::ZERO);
    }

    #[test]
    fn test_dig_adds_implicit_move() {
        let (mut grid, id, rules) = setup(UnitKind::Digger);
        submit_command(&mut grid, id, Command::dig(coord(1, 0)), &rules).unwrap();

        assert_eq!(
            kinds(&grid, id),
            vec![
                (StepKind::Move, coord(1, 0), false),
                (StepKind::Dig, coord(1, 0), false),
                (StepKind::Dig, coord(1, 0), true),
            ]
        );
        assert_eq!(grid.unit(id).unwrap().commands.len(), 1);
    }

    #[test]
    fn test_incremental_costs_through_forest() {
        let rules = Rules::default();
        let mut grid = Grid::new(
            3,
            1,
            vec![TileType::Grassland, TileType::Forest, TileType::Grassland],
        )
        .unwrap();
        let id = grid
            .spawn_unit(UnitKind::Digger, coord(0, 0), Fixed::from_num(4))
            .unwrap();
        submit_command(&mut grid, id, Command::move_to(coord(2, 0)), &rules).unwrap();

        let costs: Vec<Cost> = grid.unit(id).unwrap().steps.iter().map(|s| s.cost).collect();
        assert_eq!(costs, vec![Cost::from_int(2), Cost::from_int(1), Cost::ZERO]);
    }

    #[test]
    fn test_move_to_water_is_invalid() {
        let (mut grid, id, rules) = setup(UnitKind::Digger);
        grid.set_tile_type(coord(4, 0), TileType::Water).unwrap();
        submit_command(&mut grid, id, Command::move_to(coord(5, 0)), &rules).unwrap();

        let unit = grid.unit(id).unwrap();
        assert!(unit.has_invalid_step());
        assert_eq!(unit.steps[0].cost, Cost::Infinite);
    }

    #[test]
    fn test_resubmit_same_target_toggles_off() {
        let (mut grid, id, rules) = setup(UnitKind::Digger);
        let cmd = Command::move_to(coord(3, 0));
        assert_eq!(
            submit_command(&mut grid, id, cmd, &rules).unwrap(),
            SubmitOutcome::Appended
        );
        assert_eq!(
            submit_command(&mut grid, id, Command::dig(coord(3, 0)), &rules).unwrap(),
            SubmitOutcome::Removed
        );
        let unit = grid.unit(id).unwrap();
        assert!(unit.commands.is_empty());
        assert!(unit.steps.is_empty());
    }

    #[test]
    fn test_move_on_route_reroutes() {
        let (mut grid, id, rules) = setup(UnitKind::Digger);
        submit_command(&mut grid, id, Command::move_to(coord(2, 0)), &rules).unwrap();
        submit_command(&mut grid, id, Command::move_to(coord(5, 0)), &rules).unwrap();

        // (4, 0) lies on the route of the second move.
        let outcome =
            submit_command(&mut grid, id, Command::move_to(coord(4, 0)), &rules).unwrap();
        assert_eq!(outcome, SubmitOutcome::Rerouted);
        assert_eq!(
            grid.unit(id).unwrap().commands,
            vec![Command::move_to(coord(2, 0)), Command::move_to(coord(4, 0))]
        );
    }

    #[test]
    fn test_action_on_route_is_inserted() {
        let (mut grid, id, rules) = setup(UnitKind::Digger);
        submit_command(&mut grid, id, Command::move_to(coord(2, 0)), &rules).unwrap();
        submit_command(&mut grid, id, Command::move_to(coord(5, 0)), &rules).unwrap();

        let outcome = submit_command(&mut grid, id, Command::dig(coord(3, 0)), &rules).unwrap();
        assert_eq!(outcome, SubmitOutcome::Inserted);
        assert_eq!(
            grid.unit(id).unwrap().commands,
            vec![
                Command::move_to(coord(2, 0)),
                Command::dig(coord(3, 0)),
                Command::move_to(coord(5, 0)),
            ]
        );
    }

    #[test]
    fn test_illegal_command_rejected() {
        let (mut grid, id, rules) = setup(UnitKind::Digger);
        let result = submit_command(&mut grid, id, Command::extinguish(coord(1, 0)), &rules);
        assert_eq!(
            result,
            Err(GameError::IllegalCommand {
                kind: UnitKind::Digger,
                action: "extinguish"
            })
        );

        let (mut grid, id, rules) = setup(UnitKind::Truck);
        assert!(submit_command(&mut grid, id, Command::dig(coord(1, 0)), &rules).is_err());
        assert!(grid.unit(id).unwrap().commands.is_empty());
    }

    #[test]
    fn test_compile_is_deterministic() {
        let (mut grid, id, rules) = setup(UnitKind::Digger);
        submit_command(&mut grid, id, Command::dig(coord(3, 0)), &rules).unwrap();
        submit_command(&mut grid, id, Command::move_to(coord(1, 0)), &rules).unwrap();

        let unit = grid.unit(id).unwrap();
        assert_eq!(compile(&grid, unit, &rules), compile(&grid, unit, &rules));
        assert_eq!(compile(&grid, unit, &rules), unit.steps);
    }

    #[test]
    fn test_clear_commands_empties_steps() {
        let (mut grid, id, rules) = setup(UnitKind::Digger);
        submit_command(&mut grid, id, Command::dig(coord(3, 0)), &rules).unwrap();
        clear_commands(&mut grid, id, &rules).unwrap();

        let unit = grid.unit(id).unwrap();
        assert!(unit.commands.is_empty());
        assert!(compile(&grid, unit, &rules).is_empty());
    }

    #[test]
    fn test_out_of_bounds_target_rejected() {
        let (mut grid, id, rules) = setup(UnitKind::Digger);
        let result = submit_command(&mut grid, id, Command::move_to(coord(9, 9)), &rules);
        assert!(matches!(result, Err(GameError::OutOfBounds { .. })));
    }
}
