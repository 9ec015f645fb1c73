//! Budget-limited playback of one unit's compiled steps.
//!
//! A unit walks its steps in order, paying each step's cost out of its
//! remaining action points. Walking onto a burning tile kills the unit
//! unless the plan puts that fire out before leaving the tile.

use serde::{Deserialize, Serialize};

use crate::compiler::recompile;
use crate::components::{CommandStep, StepKind, UnitId};
use crate::error::Result;
use crate::grid::{Grid, TileCoord};
use crate::math::{fixed_serde, Fixed};
use crate::rules::Rules;

/// Why a unit stopped executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// Every step ran.
    Completed,
    /// The next step cost more than the remaining budget.
    OutOfBudget,
    /// The plan reached an unreachable target.
    Blocked,
    /// The unit walked into fire and died.
    Killed,
}

/// Result of executing one unit for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Unit that executed.
    pub unit: UnitId,
    /// Why execution stopped.
    pub outcome: ExecutionOutcome,
    /// Number of non-marker steps carried out.
    pub steps_executed: usize,
    /// Action points left.
    #[serde(with = "fixed_serde")]
    pub remaining: Fixed,
    /// Tile the unit ended on (or died on).
    pub final_tile: TileCoord,
}

/// Execute a unit's compiled steps against the grid.
///
/// Completed commands are removed from the unit's list and the survivor's
/// plan is recompiled against the updated grid. If the tile the walk ends
/// on is held by another unit, the unit stops on the last free tile it
/// passed instead.
pub fn execute(grid: &mut Grid, id: UnitId, rules: &Rules) -> Result<ExecutionReport> {
    let unit = grid.unit(id)?;
    let steps = unit.steps.clone();
    let start = unit.tile;
    let mut budget = unit.remaining;

    let mut current = start;
    let mut last_free = start;
    let mut completed = Vec::new();
    let mut steps_executed = 0;
    let mut outcome = ExecutionOutcome::Completed;

    for (index, step) in steps.iter().enumerate() {
        if let Some(command) = step.completed_command() {
            completed.push(command);
            continue;
        }
        if step.kind == StepKind::Invalid {
            outcome = ExecutionOutcome::Blocked;
            break;
        }
        let Some(left) = step.cost.spend_from(budget) else {
            outcome = ExecutionOutcome::OutOfBudget;
            break;
        };
        budget = left;

        match step.kind {
            StepKind::Move => {
                if grid.is_burning(step.target) && !extinguishes_before_leaving(&steps, index, budget)
                {
                    outcome = ExecutionOutcome::Killed;
                    break;
                }
                current = step.target;
                if grid.tile(current).is_some_and(|t| t.unit.is_none()) {
                    last_free = current;
                }
            }
            StepKind::Dig => grid.dig_fireline(step.target)?,
            StepKind::Extinguish => {
                grid.extinguish(step.target)?;
            }
            StepKind::Invalid => {}
        }
        steps_executed += 1;
        tracing::debug!(unit = id, step = ?step.kind, tile = %step.target, %budget, "Step executed");
    }

    let final_tile = match grid.tile(current) {
        Some(tile) if tile.unit.is_none() || tile.unit == Some(id) => current,
        _ => last_free,
    };
    grid.move_unit(id, final_tile)?;

    if outcome == ExecutionOutcome::Killed {
        grid.kill_unit(id)?;
    } else {
        let unit = grid.unit_mut(id)?;
        for command in &completed {
            if let Some(pos) = unit.commands.iter().position(|c| c == command) {
                unit.commands.remove(pos);
            }
        }
        unit.remaining = budget;
        recompile(grid, id, rules)?;
    }

    tracing::debug!(unit = id, ?outcome, steps_executed, %final_tile, "Unit finished executing");

    Ok(ExecutionReport {
        unit: id,
        outcome,
        steps_executed,
        remaining: budget,
        final_tile,
    })
}

/// Check if the steps after `index` put out the fire on that step's tile
/// before the unit moves on, within the remaining budget.
fn extinguishes_before_leaving(steps: &[CommandStep], index: usize, mut budget: Fixed) -> bool {
    let tile = steps[index].target;
    for step in steps[index + 1..].iter().filter(|s| !s.marker) {
        match step.cost.spend_from(budget) {
            Some(left) => budget = left,
            None => return false,
        }
        match step.kind {
            StepKind::Extinguish if step.target == tile => return true,
            StepKind::Move | StepKind::Invalid => return false,
            _ => {}
        }
    }
    false
}
