//! Price level with FIFO queue
//!
//! A price level holds all resting orders at one price point, in strict
//! arrival order. FIFO within the level is what makes the tie-break at
//! equal price deterministic and auditable.

use std::collections::VecDeque;
use types::ids::{OrderId, UserId};
use types::numeric::{Price, Quantity};

/// A resting order's footprint on the book.
///
/// The full order record lives with the engine; the book only needs
/// identity, owner, price and what is left to fill.
#[derive(Debug, Clone, PartialEq)]
pub struct BookEntry {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub price: Price,
    pub remaining: Quantity,
    /// Submission timestamp (Unix nanos), carried for audit
    pub created_at: i64,
}

/// Orders at a single price, in FIFO order.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    orders: VecDeque<BookEntry>,
    total_quantity: Quantity,
}

impl PriceLevel {
    /// Create a new empty price level
    pub fn new() -> Self {
        Self {
            orders: VecDeque::new(),
            total_quantity: Quantity::zero(),
        }
    }

    /// Append an entry at the back of the queue (time priority)
    pub fn insert(&mut self, entry: BookEntry) {
        self.total_quantity = self.total_quantity + entry.remaining;
        self.orders.push_back(entry);
    }

    /// Remove an entry by id.
    ///
    /// Returns the removed entry's remaining quantity, or None if absent.
    pub fn remove(&mut self, order_id: &OrderId) -> Option<Quantity> {
        let position = self.orders.iter().position(|e| &e.order_id == order_id)?;
        let entry = self.orders.remove(position)?;

        self.total_quantity = self
            .total_quantity
            .checked_sub(entry.remaining)
            .unwrap_or_else(Quantity::zero);

        Some(entry.remaining)
    }

    /// Peek at the front entry without removing it
    pub fn front(&self) -> Option<&BookEntry> {
        self.orders.front()
    }

    /// Reduce the front entry's remaining quantity after a fill.
    ///
    /// If the entry is fully consumed it is removed from the queue.
    pub fn fill_front(&mut self, fill: Quantity) {
        let Some(entry) = self.orders.front_mut() else {
            return;
        };

        let new_remaining = entry
            .remaining
            .checked_sub(fill)
            .expect("fill exceeds front entry remaining");

        self.total_quantity = self
            .total_quantity
            .checked_sub(fill)
            .unwrap_or_else(Quantity::zero);

        if new_remaining.is_zero() {
            self.orders.pop_front();
        } else {
            entry.remaining = new_remaining;
        }
    }

    /// Check if the price level is empty
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Total quantity resting at this level
    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    /// Number of orders at this level
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}

impl Default for PriceLevel {
    fn default() -> Self {
        Self::new()
    }
}
