//! Order lifecycle types
//!
//! An order is created on submission and mutated only by the matching
//! engine (fills) or by explicit cancellation. It is never deleted.

use crate::ids::{OrderId, PairId, UserId};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order status
///
/// Status is a pure function of `filled` vs `amount` plus explicit
/// cancellation. `Filled` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Accepted, nothing filled yet
    Open,
    /// Partially matched
    Partial,
    /// Completely matched (terminal)
    Filled,
    /// Cancelled by the owner (terminal)
    Cancelled,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }

    /// Check if an order with this status may rest on the book
    pub fn is_resting(&self) -> bool {
        matches!(self, OrderStatus::Open | OrderStatus::Partial)
    }
}

/// A limit order.
///
/// Invariant: `0 ≤ filled ≤ amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub pair: PairId,
    pub side: Side,
    pub price: Price,
    pub amount: Quantity,
    pub filled: Quantity,
    pub status: OrderStatus,
    pub created_at: i64, // Unix nanos
    pub updated_at: i64, // Unix nanos
}

impl Order {
    /// Create a new open order
    pub fn new(
        user_id: UserId,
        pair: PairId,
        side: Side,
        price: Price,
        amount: Quantity,
        timestamp: i64,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            user_id,
            pair,
            side,
            price,
            amount,
            filled: Quantity::zero(),
            status: OrderStatus::Open,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Unfilled quantity: `amount − filled`
    pub fn remaining(&self) -> Quantity {
        self.amount
            .checked_sub(self.filled)
            .expect("filled exceeds amount")
    }

    /// Check if order is completely filled
    pub fn is_filled(&self) -> bool {
        self.filled == self.amount
    }

    /// Apply a fill and recompute the derived status.
    ///
    /// # Panics
    /// Panics if the fill would exceed the remaining quantity.
    pub fn add_fill(&mut self, fill: Quantity, timestamp: i64) {
        assert!(
            fill.as_decimal() <= self.remaining().as_decimal(),
            "fill would exceed order amount"
        );
        assert!(
            self.status.is_resting(),
            "cannot fill order in terminal state"
        );

        self.filled = self.filled + fill;
        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::Partial
        };
        self.updated_at = timestamp;
    }

    /// Cancel the order.
    ///
    /// # Panics
    /// Panics if the order is already in a terminal state.
    pub fn cancel(&mut self, timestamp: i64) {
        assert!(self.status.is_resting(), "cannot cancel terminal order");
        self.status = OrderStatus::Cancelled;
        self.updated_at = timestamp;
    }
}
