//! Order book infrastructure
//!
//! Price levels with FIFO queues, the bid and ask sides, and the
//! pair-scoped [`OrderBook`] that composes them.

pub mod ask_book;
pub mod bid_book;
pub mod price_level;

pub use ask_book::AskBook;
pub use bid_book::BidBook;
pub use price_level::{BookEntry, PriceLevel};

use types::errors::{ExchangeError, ExchangeResult};
use types::ids::{OrderId, PairId};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};

/// Both sides of the book for one trading pair.
///
/// The priority ordering lives entirely in these in-memory structures so
/// match order is independent of any persistence layer and unit-testable
/// without one.
#[derive(Debug, Clone)]
pub struct OrderBook {
    pair: PairId,
    bids: BidBook,
    asks: AskBook,
}

impl OrderBook {
    /// Create an empty book for the given pair.
    pub fn new(pair: PairId) -> Self {
        Self {
            pair,
            bids: BidBook::new(),
            asks: AskBook::new(),
        }
    }

    /// The pair this book serves.
    pub fn pair(&self) -> &PairId {
        &self.pair
    }

    /// Insert a resting order.
    ///
    /// Fails if the order's pair does not match the book's pair; the
    /// order must be in a resting status with quantity remaining.
    pub fn insert(&mut self, order: &Order) -> ExchangeResult<()> {
        if order.pair != self.pair {
            return Err(ExchangeError::InvalidOrder {
                reason: format!(
                    "order pair {} does not match book pair {}",
                    order.pair, self.pair
                ),
            });
        }
        debug_assert!(order.status.is_resting());
        debug_assert!(!order.remaining().is_zero());

        match order.side {
            Side::Buy => self.bids.insert(order),
            Side::Sell => self.asks.insert(order),
        }
        Ok(())
    }

    /// Remove an order from whichever side holds it. No-op if absent.
    pub fn remove(&mut self, order_id: &OrderId) {
        if !self.bids.remove(order_id) {
            self.asks.remove(order_id);
        }
    }

    /// Best-priced, earliest-queued entry on the side opposite `side`.
    pub fn best_opposite(&self, side: Side) -> Option<BookEntry> {
        match side {
            Side::Buy => self.asks.best_entry(),
            Side::Sell => self.bids.best_entry(),
        }
    }

    /// Best bid price, if any bids rest.
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    /// Best ask price, if any asks rest.
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Aggregated depth: `(price, total quantity)` per level, best first,
    /// up to `depth` levels per side. Exposes no order ids or owners.
    pub fn snapshot(&self, depth: usize) -> (Vec<(Price, Quantity)>, Vec<(Price, Quantity)>) {
        (self.bids.depth(depth), self.asks.depth(depth))
    }

    /// Whether any resting bid crosses any resting ask.
    ///
    /// Must be false after every completed operation.
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }

    pub(crate) fn bids_mut(&mut self) -> &mut BidBook {
        &mut self.bids
    }

    pub(crate) fn asks_mut(&mut self) -> &mut AskBook {
        &mut self.asks
    }

    /// Total resting orders across both sides.
    pub fn order_count(&self) -> usize {
        self.bids.order_count() + self.asks.order_count()
    }
}
