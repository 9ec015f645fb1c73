//! Fixed-point math utilities for deterministic simulation.
//!
//! Action-point costs, path distances and world positions all use
//! fixed-point arithmetic so that a replayed turn produces identical
//! results on every platform.

use std::fmt;

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Fixed-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Serde support for `Option<Fixed>`.
pub mod option_fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize an optional fixed-point number.
    pub fn serialize<S>(value: &Option<Fixed>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_some(&v.to_bits()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize an optional fixed-point number.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Fixed>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<i64>::deserialize(deserializer)?;
        Ok(opt.map(Fixed::from_bits))
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

/// Action-point cost of a compiled step.
///
/// Unreachable steps carry [`Cost::Infinite`]; it never takes part in
/// arithmetic, which keeps the fixed-point budget free of overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cost {
    /// A finite, non-negative cost.
    Finite(#[serde(with = "fixed_serde")] Fixed),
    /// Cost of a step that can never be executed.
    Infinite,
}

impl Cost {
    /// Zero cost.
    pub const ZERO: Self = Self::Finite(Fixed::ZERO);

    /// Create a finite cost from an integer.
    #[must_use]
    pub fn from_int(n: i32) -> Self {
        Self::Finite(Fixed::from_num(n))
    }

    /// Returns the finite value, or `None` for [`Cost::Infinite`].
    #[must_use]
    pub const fn finite(self) -> Option<Fixed> {
        match self {
            Self::Finite(v) => Some(v),
            Self::Infinite => None,
        }
    }

    /// Check if this cost can never be paid.
    #[must_use]
    pub const fn is_infinite(self) -> bool {
        matches!(self, Self::Infinite)
    }

    /// Deduct this cost from a budget.
    ///
    /// Returns the remaining budget, or `None` when the budget would go
    /// negative. A budget exactly equal to the cost leaves zero.
    #[must_use]
    pub fn spend_from(self, budget: Fixed) -> Option<Fixed> {
        match self {
            Self::Finite(cost) => {
                let remaining = budget - cost;
                (remaining >= Fixed::ZERO).then_some(remaining)
            }
            Self::Infinite => None,
        }
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(v) => write!(f, "{v}"),
            Self::Infinite => f.write_str("inf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_distance_squared() {
        let a = Vec2Fixed::new(Fixed::from_num(3), Fixed::from_num(0));
        let b = Vec2Fixed::new(Fixed::from_num(0), Fixed::from_num(4));
        assert_eq!(a.distance_squared(b), Fixed::from_num(25));
    }

    #[test]
    fn test_vec2_ops() {
        let a = Vec2Fixed::new(Fixed::from_num(2), Fixed::from_num(3));
        let b = Vec2Fixed::new(Fixed::from_num(1), Fixed::from_num(1));
        assert_eq!(a - b + b, a);
    }

    #[test]
    fn test_cost_spend_exact_budget_leaves_zero() {
        let cost = Cost::from_int(2);
        assert_eq!(cost.spend_from(Fixed::from_num(2)), Some(Fixed::ZERO));
    }

    #[test]
    fn test_cost_spend_over_budget() {
        let cost = Cost::from_int(3);
        assert_eq!(cost.spend_from(Fixed::from_num(2)), None);
    }

    #[test]
    fn test_infinite_cost_never_spends() {
        assert_eq!(Cost::Infinite.spend_from(Fixed::MAX), None);
        assert!(Cost::Infinite.is_infinite());
        assert_eq!(Cost::Infinite.finite(), None);
    }
}
