//! Aggregated depth snapshots
//!
//! Price levels with total quantities only: no order ids, no owners.

use serde::{Deserialize, Serialize};
use types::ids::PairId;
use types::numeric::{Price, Quantity};

/// Point-in-time aggregated view of one pair's book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthSnapshot {
    pub pair: PairId,
    /// Monotonically increasing per pair; consumers use it to detect
    /// staleness between reads.
    pub revision: u64,
    /// Bid levels, highest price first
    pub bids: Vec<(Price, Quantity)>,
    /// Ask levels, lowest price first
    pub asks: Vec<(Price, Quantity)>,
    /// Capture timestamp (Unix nanos)
    pub timestamp: i64,
}

impl DepthSnapshot {
    pub fn new(
        pair: PairId,
        revision: u64,
        bids: Vec<(Price, Quantity)>,
        asks: Vec<(Price, Quantity)>,
        timestamp: i64,
    ) -> Self {
        Self {
            pair,
            revision,
            bids,
            asks,
            timestamp,
        }
    }

    /// Empty snapshot for a pair with no resting orders.
    pub fn empty(pair: PairId, revision: u64, timestamp: i64) -> Self {
        Self::new(pair, revision, Vec::new(), Vec::new(), timestamp)
    }

    /// Best bid price, if any.
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|(price, _)| *price)
    }

    /// Best ask price, if any.
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|(price, _)| *price)
    }
}
