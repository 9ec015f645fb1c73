//! Unit kinds and their capability table.
//!
//! Every rule that depends on "what kind of unit is this" reads a
//! [`UnitCapabilities`] entry instead of matching on the kind directly:
//! - forest move cost (or impassable)
//! - whether the unit can dig firelines or extinguish fire
//! - whether the unit acts as a firebreak on its own tile
//! - per-turn action-point range and purchase price

use serde::{Deserialize, Serialize};

use crate::math::{option_fixed_serde, Fixed};

/// Kind of firefighting unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    /// Hand crew that cuts firelines. Walks through forest at double cost.
    Digger,
    /// Engine that puts out fire. Road-bound, so forest is impassable,
    /// and its tile never ignites.
    Truck,
}

impl UnitKind {
    /// All unit kinds.
    pub const ALL: [Self; 2] = [Self::Digger, Self::Truck];
}

/// Per-kind rules consulted by movement, compilation and fire spread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCapabilities {
    /// Action points available each turn.
    pub range: u32,
    /// Treasury cost to purchase at a camp.
    pub cost: u32,
    /// Cost to enter a Forest tile, `None` if forest is impassable.
    #[serde(with = "option_fixed_serde")]
    pub forest_cost: Option<Fixed>,
    /// Can issue Dig commands.
    pub can_dig: bool,
    /// Can issue Extinguish commands.
    pub can_extinguish: bool,
    /// Fire never spreads onto a tile this unit stands on.
    pub firebreak: bool,
}

impl UnitCapabilities {
    /// Default digger crew.
    #[must_use]
    pub fn digger() -> Self {
        Self {
            range: 4,
            cost: 100,
            forest_cost: Some(Fixed::from_num(2)),
            can_dig: true,
            can_extinguish: false,
            firebreak: false,
        }
    }

    /// Default fire truck.
    #[must_use]
    pub fn truck() -> Self {
        Self {
            range: 6,
            cost: 250,
            forest_cost: None,
            can_dig: false,
            can_extinguish: true,
            firebreak: true,
        }
    }

    /// Per-turn range as a fixed-point budget.
    #[must_use]
    pub fn budget(&self) -> Fixed {
        Fixed::from_num(self.range)
    }
}

/// Capability table keyed by [`UnitKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityTable {
    /// Digger entry.
    pub digger: UnitCapabilities,
    /// Truck entry.
    pub truck: UnitCapabilities,
}

impl CapabilityTable {
    /// Look up the capabilities of a kind.
    #[must_use]
    pub const fn get(&self, kind: UnitKind) -> &UnitCapabilities {
        match kind {
            UnitKind::Digger => &self.digger,
            UnitKind::Truck => &self.truck,
        }
    }
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self {
            digger: UnitCapabilities::digger(),
            truck: UnitCapabilities::truck(),
        }
    }
}
