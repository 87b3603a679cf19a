//! Trading pair registry
//!
//! The explicit source of truth for which pairs exist and which accept
//! orders. Lanes are constructed from this registry; there is no
//! process-wide pair list.

use std::collections::HashMap;

use types::errors::{ExchangeError, ExchangeResult};
use types::ids::PairId;
use types::pair::TradingPair;

/// Registered trading pairs with their metadata.
#[derive(Debug, Default)]
pub struct PairRegistry {
    pairs: HashMap<PairId, TradingPair>,
}

impl PairRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a pair.
    pub fn register(&mut self, pair: TradingPair) {
        self.pairs.insert(pair.pair.clone(), pair);
    }

    /// Stop accepting new orders for a pair. Resting orders and reads
    /// are unaffected. Returns false if the pair was never registered.
    pub fn deactivate(&mut self, pair_id: &PairId) -> bool {
        match self.pairs.get_mut(pair_id) {
            Some(pair) => {
                pair.active = false;
                true
            }
            None => false,
        }
    }

    /// Look up a pair regardless of its active flag.
    pub fn get(&self, pair_id: &PairId) -> Option<&TradingPair> {
        self.pairs.get(pair_id)
    }

    /// Look up a pair that must be active, for order submission.
    pub fn get_active(&self, pair_id: &PairId) -> ExchangeResult<&TradingPair> {
        match self.pairs.get(pair_id) {
            Some(pair) if pair.active => Ok(pair),
            _ => Err(ExchangeError::UnknownPair {
                pair: pair_id.to_string(),
            }),
        }
    }

    /// All registered pairs.
    pub fn iter(&self) -> impl Iterator<Item = &TradingPair> {
        self.pairs.values()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
