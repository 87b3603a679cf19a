//! Ask (sell-side) order book
//!
//! Sell orders sorted by price ascending (best ask = lowest price).
//! Mirror of [`super::BidBook`] with the opposite best-price end.

use std::collections::BTreeMap;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};
use types::order::Order;

use super::price_level::{BookEntry, PriceLevel};

/// Ask side of a book.
#[derive(Debug, Clone)]
pub struct AskBook {
    /// Price levels ascending; the best ask is the first key.
    levels: BTreeMap<Price, PriceLevel>,
}

impl AskBook {
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Insert an order's footprint at its price level.
    pub fn insert(&mut self, order: &Order) {
        let level = self.levels.entry(order.price).or_default();
        level.insert(BookEntry {
            order_id: order.order_id,
            user_id: order.user_id,
            price: order.price,
            remaining: order.remaining(),
            created_at: order.created_at,
        });
    }

    /// Remove an order by id, pruning its level if emptied.
    ///
    /// Returns true if the order was found and removed.
    pub fn remove(&mut self, order_id: &OrderId) -> bool {
        let mut emptied: Option<Price> = None;
        let mut found = false;

        for (price, level) in self.levels.iter_mut() {
            if level.remove(order_id).is_some() {
                found = true;
                if level.is_empty() {
                    emptied = Some(*price);
                }
                break;
            }
        }

        if let Some(price) = emptied {
            self.levels.remove(&price);
        }
        found
    }

    /// Best ask price (lowest).
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next().copied()
    }

    /// Front entry of the best level: the next ask to match against.
    pub fn best_entry(&self) -> Option<BookEntry> {
        self.levels
            .values()
            .next()
            .and_then(|level| level.front().cloned())
    }

    /// Consume `fill` from the front of the best level, pruning if emptied.
    pub(crate) fn fill_best(&mut self, fill: Quantity) {
        let Some(price) = self.best_price() else {
            return;
        };
        if let Some(level) = self.levels.get_mut(&price) {
            level.fill_front(fill);
            if level.is_empty() {
                self.levels.remove(&price);
            }
        }
    }

    /// Aggregated depth: top `depth` levels, lowest price first.
    pub fn depth(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.levels
            .iter()
            .take(depth)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn order_count(&self) -> usize {
        self.levels.values().map(|l| l.order_count()).sum()
    }
}

impl Default for AskBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::{PairId, UserId};
    use types::order::Side;

    fn ask(price: u64, amount: &str) -> Order {
        Order::new(
            UserId::new(),
            PairId::new("BTC/USDT"),
            Side::Sell,
            Price::from_u64(price),
            Quantity::from_str(amount).unwrap(),
            1000,
        )
    }

    #[test]
    fn test_best_is_lowest() {
        let mut book = AskBook::new();
        book.insert(&ask(50100, "1.0"));
        book.insert(&ask(50050, "2.0"));
        book.insert(&ask(50200, "1.5"));

        assert_eq!(book.best_price(), Some(Price::from_u64(50050)));
    }

    #[test]
    fn test_depth_lowest_first() {
        let mut book = AskBook::new();
        book.insert(&ask(50100, "1.0"));
        book.insert(&ask(50050, "2.0"));
        book.insert(&ask(50200, "1.5"));

        let depth = book.depth(2);
        assert_eq!(depth.len(), 2);
        assert_eq!(depth[0].0, Price::from_u64(50050));
        assert_eq!(depth[1].0, Price::from_u64(50100));
    }

    #[test]
    fn test_same_price_fifo() {
        let mut book = AskBook::new();
        let first = ask(50000, "1.0");
        let second = ask(50000, "2.0");
        book.insert(&first);
        book.insert(&second);

        assert_eq!(book.best_entry().unwrap().order_id, first.order_id);
        book.fill_best(Quantity::from_u64(1));
        assert_eq!(book.best_entry().unwrap().order_id, second.order_id);
    }

    #[test]
    fn test_remove_absent_returns_false() {
        let mut book = AskBook::new();
        book.insert(&ask(50000, "1.0"));
        assert!(!book.remove(&OrderId::new()));
        assert_eq!(book.order_count(), 1);
    }
}
