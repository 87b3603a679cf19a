//! Per-asset balance with reservation accounting
//!
//! Invariant: `total = available + locked`. The locked portion is the sum
//! of reservations held by that user's open orders.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balance for a single asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub asset: String,
    pub total: Decimal,
    pub available: Decimal,
    pub locked: Decimal,
}

impl Balance {
    /// Create a new balance with everything available
    pub fn new(asset: impl Into<String>, total: Decimal) -> Self {
        Self {
            asset: asset.into(),
            total,
            available: total,
            locked: Decimal::ZERO,
        }
    }

    /// Create an empty balance for an asset
    pub fn empty(asset: impl Into<String>) -> Self {
        Self::new(asset, Decimal::ZERO)
    }

    /// Check balance invariant: total = available + locked
    pub fn check_invariant(&self) -> bool {
        self.total == self.available + self.locked
            && self.available >= Decimal::ZERO
            && self.locked >= Decimal::ZERO
    }

    /// Whether `amount` can be locked from the available portion
    pub fn can_lock(&self, amount: Decimal) -> bool {
        amount >= Decimal::ZERO && amount <= self.available
    }

    /// Whether `amount` is currently held in the locked portion
    pub fn has_locked(&self, amount: Decimal) -> bool {
        amount >= Decimal::ZERO && amount <= self.locked
    }

    /// Lock a portion of available balance (order reservation)
    ///
    /// # Panics
    /// Panics if amount exceeds available or violates the invariant
    pub fn lock(&mut self, amount: Decimal) {
        assert!(self.can_lock(amount), "insufficient available balance");

        self.available -= amount;
        self.locked += amount;

        assert!(self.check_invariant(), "invariant violated after lock");
    }

    /// Unlock a portion of locked balance (cancel, over-reservation release)
    ///
    /// # Panics
    /// Panics if amount exceeds locked or violates the invariant
    pub fn unlock(&mut self, amount: Decimal) {
        assert!(self.has_locked(amount), "insufficient locked balance");

        self.locked -= amount;
        self.available += amount;

        assert!(self.check_invariant(), "invariant violated after unlock");
    }

    /// Deduct from locked balance (trade settlement debit)
    ///
    /// # Panics
    /// Panics if amount exceeds locked or violates the invariant
    pub fn deduct_locked(&mut self, amount: Decimal) {
        assert!(self.has_locked(amount), "insufficient locked balance");

        self.locked -= amount;
        self.total -= amount;

        assert!(self.check_invariant(), "invariant violated after deduct");
    }

    /// Credit to available balance (deposit, trade settlement credit)
    ///
    /// # Panics
    /// Panics if amount is negative
    pub fn credit(&mut self, amount: Decimal) {
        assert!(amount >= Decimal::ZERO, "credit amount must be non-negative");

        self.available += amount;
        self.total += amount;

        assert!(self.check_invariant(), "invariant violated after credit");
    }

    /// Debit directly from available balance (withdrawal)
    ///
    /// # Panics
    /// Panics if amount exceeds available
    pub fn debit_available(&mut self, amount: Decimal) {
        assert!(self.can_lock(amount), "insufficient available balance");

        self.available -= amount;
        self.total -= amount;

        assert!(self.check_invariant(), "invariant violated after debit");
    }
}
