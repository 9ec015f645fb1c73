//! Treasury and per-turn income.
//!
//! Every enabled tile that is not burning yields its type's profit at the
//! start of each resolution. All amounts are integers.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::grid::Grid;
use crate::rules::ProfitTable;

/// The player's money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Treasury {
    /// Money on hand.
    pub balance: u32,
    /// Total spent on purchases this match.
    pub spent: u32,
    /// Income expected at the next resolution.
    pub income_preview: u32,
}

impl Treasury {
    /// Create a treasury with a starting balance.
    #[must_use]
    pub const fn new(balance: u32) -> Self {
        Self {
            balance,
            spent: 0,
            income_preview: 0,
        }
    }

    /// Check if the player can afford a cost.
    #[must_use]
    pub const fn can_afford(&self, cost: u32) -> bool {
        self.balance >= cost
    }

    /// Spend money, failing without change if the balance is short.
    pub fn spend(&mut self, cost: u32) -> Result<()> {
        if !self.can_afford(cost) {
            return Err(GameError::InsufficientFunds {
                required: cost,
                available: self.balance,
            });
        }
        self.balance -= cost;
        self.spent = self.spent.saturating_add(cost);
        Ok(())
    }

    /// Add income.
    pub fn deposit(&mut self, amount: u32) {
        self.balance = self.balance.saturating_add(amount);
    }
}

/// Income the grid yields this turn.
#[must_use]
pub fn turn_income(grid: &Grid, profits: &ProfitTable) -> u32 {
    grid.tiles()
        .iter()
        .filter(|t| !t.disabled && !t.is_burning())
        .map(|t| profits.for_type(t.tile_type))
        .fold(0u32, u32::saturating_add)
}
