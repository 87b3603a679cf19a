//! Fixed-point decimal types for prices and quantities
//!
//! Thin newtypes over `rust_decimal::Decimal` so a price can never be
//! passed where a quantity is expected. All arithmetic is deterministic;
//! floating point is banned from the core.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// A strictly positive limit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Create a price, returning None unless the value is strictly positive.
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Create a price from an integer number of quote units.
    ///
    /// # Panics
    /// Panics if `value` is zero.
    pub fn from_u64(value: u64) -> Self {
        Self::try_new(Decimal::from(value)).expect("price must be positive")
    }

    /// Parse a price from a decimal string (e.g. "50000.25").
    pub fn from_str(s: &str) -> Option<Self> {
        s.parse::<Decimal>().ok().and_then(Self::try_new)
    }

    /// Get the inner decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Number of decimal places, ignoring trailing zeros.
    pub fn scale(&self) -> u32 {
        self.0.normalize().scale()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative order or trade quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Create a quantity, returning None if the value is negative.
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value >= Decimal::ZERO {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Create a quantity from a non-negative decimal.
    ///
    /// # Panics
    /// Panics if `value` is negative.
    pub fn new(value: Decimal) -> Self {
        Self::try_new(value).expect("quantity must be non-negative")
    }

    /// Create a quantity from an integer number of base units.
    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    /// Parse a quantity from a decimal string (e.g. "0.5").
    pub fn from_str(s: &str) -> Option<Self> {
        s.parse::<Decimal>().ok().and_then(Self::try_new)
    }

    /// The zero quantity.
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Whether this quantity is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Get the inner decimal value.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Number of decimal places, ignoring trailing zeros.
    pub fn scale(&self) -> u32 {
        self.0.normalize().scale()
    }

    /// Subtract, returning None if the result would be negative.
    pub fn checked_sub(&self, other: Quantity) -> Option<Self> {
        Self::try_new(self.0 - other.0)
    }

    /// The smaller of two quantities.
    pub fn min(self, other: Quantity) -> Self {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, other: Quantity) -> Quantity {
        Quantity(self.0 + other.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
