//! The exchange facade
//!
//! Owns the pair registry, the shared balance ledger, and one lane per
//! registered pair. This is the whole public surface the excluded
//! web/API layer calls into; the caller is assumed to have already
//! authenticated the user id it passes in.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use rust_decimal::Decimal;
use tracing::info;

use market_data::{DepthSnapshot, MarketDataCache, Ticker};
use order_store::OrderStore;
use settlement::BalanceLedger;
use types::errors::{ExchangeError, ExchangeResult};
use types::ids::{OrderId, PairId, UserId};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};
use types::trade::Trade;

use crate::config::ExchangeConfig;
use crate::lane::{self, LaneHandle};
use crate::registry::PairRegistry;

/// The matching and settlement core.
pub struct Exchange {
    registry: PairRegistry,
    ledger: Arc<Mutex<BalanceLedger>>,
    store: Arc<dyn OrderStore>,
    lanes: HashMap<PairId, LaneHandle>,
    caches: HashMap<PairId, Arc<RwLock<MarketDataCache>>>,
}

impl Exchange {
    /// Build the exchange and spawn a lane for every registered pair.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(
        registry: PairRegistry,
        store: Arc<dyn OrderStore>,
        config: ExchangeConfig,
    ) -> ExchangeResult<Self> {
        std::fs::create_dir_all(&config.journal_dir)
            .map_err(|e| ExchangeError::Store(e.to_string()))?;

        let ledger = Arc::new(Mutex::new(BalanceLedger::new()));
        let mut lanes = HashMap::new();
        let mut caches = HashMap::new();

        for pair in registry.iter() {
            let cache = Arc::new(RwLock::new(MarketDataCache::new(
                pair.pair.clone(),
                types::now_nanos(),
            )));
            let journal_path = config.journal_dir.join(format!(
                "{}.journal",
                pair.pair.as_str().replace('/', "-")
            ));

            let handle = lane::spawn(
                pair.clone(),
                ledger.clone(),
                store.clone(),
                cache.clone(),
                journal_path,
                config.tape_capacity,
                config.max_depth,
                config.lane_buffer,
            )?;

            lanes.insert(pair.pair.clone(), handle);
            caches.insert(pair.pair.clone(), cache);
        }

        info!(pairs = lanes.len(), "exchange started");
        Ok(Self {
            registry,
            ledger,
            store,
            lanes,
            caches,
        })
    }

    /// Submit a limit order.
    ///
    /// Validation failures (`InvalidOrder`, `UnknownPair`,
    /// `InsufficientBalance`) reject the order with no state change.
    pub async fn submit_order(
        &self,
        user: UserId,
        pair_id: &PairId,
        side: Side,
        price: Price,
        amount: Quantity,
    ) -> ExchangeResult<Order> {
        let pair = self.registry.get_active(pair_id)?;
        pair.validate(price, amount)?;

        let lane = self
            .lanes
            .get(pair_id)
            .ok_or_else(|| ExchangeError::UnknownPair {
                pair: pair_id.to_string(),
            })?;
        lane.submit(user, side, price, amount).await
    }

    /// Cancel a resting order owned by `user`.
    pub async fn cancel_order(&self, order_id: OrderId, user: UserId) -> ExchangeResult<Order> {
        let order = self
            .store
            .get_order(&order_id)
            .map_err(|e| ExchangeError::Store(e.to_string()))?
            .ok_or_else(|| ExchangeError::NotFound {
                order_id: order_id.to_string(),
            })?;

        let lane = self
            .lanes
            .get(&order.pair)
            .ok_or_else(|| ExchangeError::NotFound {
                order_id: order_id.to_string(),
            })?;
        lane.cancel(order_id, user).await
    }

    /// Aggregated book depth for a pair, from the lane's published cache.
    pub fn order_book(&self, pair_id: &PairId, depth: usize) -> ExchangeResult<DepthSnapshot> {
        let cache = self
            .caches
            .get(pair_id)
            .ok_or_else(|| ExchangeError::UnknownPair {
                pair: pair_id.to_string(),
            })?;
        Ok(cache.read().expect("cache lock poisoned").depth(depth))
    }

    /// Ticker for a pair.
    pub fn ticker(&self, pair_id: &PairId) -> ExchangeResult<Ticker> {
        let cache = self
            .caches
            .get(pair_id)
            .ok_or_else(|| ExchangeError::UnknownPair {
                pair: pair_id.to_string(),
            })?;
        Ok(cache.read().expect("cache lock poisoned").ticker())
    }

    /// Recent trades for a pair, newest first.
    pub fn trades(&self, pair_id: &PairId, limit: usize) -> ExchangeResult<Vec<Trade>> {
        if self.registry.get(pair_id).is_none() {
            return Err(ExchangeError::UnknownPair {
                pair: pair_id.to_string(),
            });
        }
        self.store
            .trades(pair_id, limit)
            .map_err(|e| ExchangeError::Store(e.to_string()))
    }

    /// All of a user's orders, optionally restricted to one pair,
    /// newest first.
    pub fn user_orders(&self, user: &UserId, pair: Option<&PairId>) -> ExchangeResult<Vec<Order>> {
        self.store
            .user_orders(user, pair)
            .map_err(|e| ExchangeError::Store(e.to_string()))
    }

    /// Credit funds to a user (custody layer entry point).
    pub fn deposit(&self, user: UserId, asset: &str, amount: Decimal) -> ExchangeResult<()> {
        self.ledger
            .lock()
            .expect("ledger mutex poisoned")
            .deposit(user, asset, amount)
    }

    /// Withdraw from a user's available balance; reserved funds stay put.
    pub fn withdraw(&self, user: UserId, asset: &str, amount: Decimal) -> ExchangeResult<()> {
        self.ledger
            .lock()
            .expect("ledger mutex poisoned")
            .withdraw(user, asset, amount)
    }

    /// A user's available balance for an asset.
    pub fn available(&self, user: &UserId, asset: &str) -> Decimal {
        self.ledger
            .lock()
            .expect("ledger mutex poisoned")
            .available(user, asset)
    }

    /// A user's reserved balance for an asset.
    pub fn locked(&self, user: &UserId, asset: &str) -> Decimal {
        self.ledger
            .lock()
            .expect("ledger mutex poisoned")
            .locked(user, asset)
    }

    /// Total supply of an asset across all accounts, fee collector
    /// included.
    pub fn asset_supply(&self, asset: &str) -> Decimal {
        self.ledger
            .lock()
            .expect("ledger mutex poisoned")
            .asset_supply(asset)
    }

    /// The registered pairs.
    pub fn registry(&self) -> &PairRegistry {
        &self.registry
    }
}
