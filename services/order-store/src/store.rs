//! Order and trade store
//!
//! The engine's view of durable storage: orders keyed by id, trades per
//! pair in execution order. The store is an external collaborator in
//! production; `MemoryStore` is the in-process implementation used by
//! the core and its tests.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;
use types::ids::{OrderId, PairId, UserId};
use types::order::Order;
use types::trade::Trade;

/// Errors from the durable store.
///
/// Transient failures are eligible for the caller's bounded retry;
/// permanent ones surface immediately.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("transient store failure: {0}")]
    Transient(String),

    #[error("permanent store failure: {0}")]
    Permanent(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Narrow interface the engine depends on.
///
/// `apply_match_step` is the transactional unit: the trade insert and
/// both orders' fill updates must land together or not at all.
pub trait OrderStore: Send + Sync {
    /// Persist a newly accepted order.
    fn insert_order(&self, order: &Order) -> StoreResult<()>;

    /// Overwrite an order's record (cancellation, post-match state).
    fn update_order(&self, order: &Order) -> StoreResult<()>;

    /// Persist one match step atomically: the trade plus both orders'
    /// post-step records.
    fn apply_match_step(&self, trade: &Trade, maker: &Order, taker: &Order) -> StoreResult<()>;

    /// Fetch an order by id.
    fn get_order(&self, order_id: &OrderId) -> StoreResult<Option<Order>>;

    /// All orders belonging to a user, optionally restricted to a pair,
    /// newest first.
    fn user_orders(&self, user: &UserId, pair: Option<&PairId>) -> StoreResult<Vec<Order>>;

    /// Recent trades for a pair, newest first, up to `limit`.
    fn trades(&self, pair: &PairId, limit: usize) -> StoreResult<Vec<Trade>>;
}

#[derive(Default)]
struct Inner {
    orders: HashMap<OrderId, Order>,
    /// Per-user order ids in insertion order
    by_user: HashMap<UserId, Vec<OrderId>>,
    /// Per-pair trades in execution order
    trades: HashMap<PairId, Vec<Trade>>,
}

/// In-memory store. A single mutex makes every operation, including the
/// multi-record `apply_match_step`, atomic with respect to readers.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("store mutex poisoned")
    }

    fn upsert(inner: &mut Inner, order: &Order) {
        if !inner.orders.contains_key(&order.order_id) {
            inner
                .by_user
                .entry(order.user_id)
                .or_default()
                .push(order.order_id);
        }
        inner.orders.insert(order.order_id, order.clone());
    }
}

impl OrderStore for MemoryStore {
    fn insert_order(&self, order: &Order) -> StoreResult<()> {
        let mut inner = self.lock();
        Self::upsert(&mut inner, order);
        Ok(())
    }

    fn update_order(&self, order: &Order) -> StoreResult<()> {
        let mut inner = self.lock();
        Self::upsert(&mut inner, order);
        Ok(())
    }

    fn apply_match_step(&self, trade: &Trade, maker: &Order, taker: &Order) -> StoreResult<()> {
        let mut inner = self.lock();
        inner
            .trades
            .entry(trade.pair.clone())
            .or_default()
            .push(trade.clone());
        Self::upsert(&mut inner, maker);
        Self::upsert(&mut inner, taker);
        Ok(())
    }

    fn get_order(&self, order_id: &OrderId) -> StoreResult<Option<Order>> {
        Ok(self.lock().orders.get(order_id).cloned())
    }

    fn user_orders(&self, user: &UserId, pair: Option<&PairId>) -> StoreResult<Vec<Order>> {
        let inner = self.lock();
        let ids = inner.by_user.get(user).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .rev()
            .filter_map(|id| inner.orders.get(id))
            .filter(|o| pair.map(|p| &o.pair == p).unwrap_or(true))
            .cloned()
            .collect())
    }

    fn trades(&self, pair: &PairId, limit: usize) -> StoreResult<Vec<Trade>> {
        let inner = self.lock();
        Ok(inner
            .trades
            .get(pair)
            .map(|trades| trades.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use types::numeric::{Price, Quantity};
    use types::order::Side;

    fn order(user: UserId, pair: &str, ts: i64) -> Order {
        Order::new(
            user,
            PairId::new(pair),
            Side::Buy,
            Price::from_u64(100),
            Quantity::from_u64(1),
            ts,
        )
    }

    fn trade(pair: &str, sequence: u64) -> Trade {
        Trade::new(
            sequence,
            PairId::new(pair),
            OrderId::new(),
            OrderId::new(),
            UserId::new(),
            UserId::new(),
            Side::Buy,
            Price::from_u64(100),
            Quantity::from_u64(1),
            Decimal::ZERO,
            Decimal::ZERO,
            sequence as i64,
        )
    }

    #[test]
    fn test_insert_and_get() {
        let store = MemoryStore::new();
        let o = order(UserId::new(), "BTC/USDT", 1);

        store.insert_order(&o).unwrap();
        assert_eq!(store.get_order(&o.order_id).unwrap(), Some(o));
        assert_eq!(store.get_order(&OrderId::new()).unwrap(), None);
    }

    #[test]
    fn test_user_orders_newest_first_with_pair_filter() {
        let store = MemoryStore::new();
        let user = UserId::new();

        let first = order(user, "BTC/USDT", 1);
        let second = order(user, "ETH/USDT", 2);
        let third = order(user, "BTC/USDT", 3);
        store.insert_order(&first).unwrap();
        store.insert_order(&second).unwrap();
        store.insert_order(&third).unwrap();
        store.insert_order(&order(UserId::new(), "BTC/USDT", 4)).unwrap();

        let all = store.user_orders(&user, None).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].order_id, third.order_id);

        let btc_pair = PairId::new("BTC/USDT");
        let btc = store.user_orders(&user, Some(&btc_pair)).unwrap();
        assert_eq!(btc.len(), 2);
        assert_eq!(btc[0].order_id, third.order_id);
        assert_eq!(btc[1].order_id, first.order_id);
    }

    #[test]
    fn test_trades_newest_first_with_limit() {
        let store = MemoryStore::new();
        let pair = PairId::new("BTC/USDT");

        for seq in 1..=5 {
            let t = trade("BTC/USDT", seq);
            store
                .apply_match_step(&t, &order(UserId::new(), "BTC/USDT", 1), &order(UserId::new(), "BTC/USDT", 2))
                .unwrap();
        }

        let recent = store.trades(&pair, 3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].sequence, 5);
        assert_eq!(recent[2].sequence, 3);
    }

    #[test]
    fn test_apply_match_step_updates_orders() {
        let store = MemoryStore::new();
        let mut maker = order(UserId::new(), "BTC/USDT", 1);
        let mut taker = order(UserId::new(), "BTC/USDT", 2);
        store.insert_order(&maker).unwrap();
        store.insert_order(&taker).unwrap();

        maker.add_fill(Quantity::from_u64(1), 3);
        taker.add_fill(Quantity::from_u64(1), 3);
        store
            .apply_match_step(&trade("BTC/USDT", 1), &maker, &taker)
            .unwrap();

        assert!(store.get_order(&maker.order_id).unwrap().unwrap().is_filled());
        assert!(store.get_order(&taker.order_id).unwrap().unwrap().is_filled());
    }
}
