//! Ticker and per-pair market data cache
//!
//! The cache is owned by the pair's lane and rebuilt synchronously after
//! every mutating operation; readers take cheap clones of the current
//! snapshot and ticker.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;
use types::ids::PairId;
use types::numeric::{Price, Quantity};

use crate::depth::DepthSnapshot;
use crate::tape::TradeTape;

/// Rolling volume window: 24 hours in nanoseconds.
const VOLUME_WINDOW_NANOS: i64 = 24 * 60 * 60 * 1_000_000_000;

/// Summary statistics for one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub pair: PairId,
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
    pub last_price: Option<Price>,
    /// Base volume over the rolling window
    pub base_volume: Decimal,
    /// Quote volume over the rolling window
    pub quote_volume: Decimal,
    pub revision: u64,
    pub updated_at: i64,
}

/// Per-pair cache of depth + ticker, derived from book and tape.
#[derive(Debug)]
pub struct MarketDataCache {
    pair: PairId,
    revision: u64,
    depth: DepthSnapshot,
    ticker: Ticker,
}

impl MarketDataCache {
    pub fn new(pair: PairId, timestamp: i64) -> Self {
        let depth = DepthSnapshot::empty(pair.clone(), 0, timestamp);
        let ticker = Ticker {
            pair: pair.clone(),
            best_bid: None,
            best_ask: None,
            last_price: None,
            base_volume: Decimal::ZERO,
            quote_volume: Decimal::ZERO,
            revision: 0,
            updated_at: timestamp,
        };
        Self {
            pair,
            revision: 0,
            depth,
            ticker,
        }
    }

    /// Rebuild the cache from the current book levels and trade tape.
    ///
    /// Called by the lane after each completed submit/cancel for this
    /// pair; each refresh bumps the revision.
    pub fn refresh(
        &mut self,
        bids: Vec<(Price, Quantity)>,
        asks: Vec<(Price, Quantity)>,
        tape: &TradeTape,
        timestamp: i64,
    ) {
        self.revision += 1;

        self.depth = DepthSnapshot::new(
            self.pair.clone(),
            self.revision,
            bids,
            asks,
            timestamp,
        );

        let (base_volume, quote_volume) =
            tape.rolling_volume(timestamp - VOLUME_WINDOW_NANOS);

        self.ticker = Ticker {
            pair: self.pair.clone(),
            best_bid: self.depth.best_bid(),
            best_ask: self.depth.best_ask(),
            last_price: tape.last_price(),
            base_volume,
            quote_volume,
            revision: self.revision,
            updated_at: timestamp,
        };

        trace!(pair = %self.pair, revision = self.revision, "market data refreshed");
    }

    /// Current depth snapshot, truncated to `depth` levels per side.
    pub fn depth(&self, depth: usize) -> DepthSnapshot {
        let mut snapshot = self.depth.clone();
        snapshot.bids.truncate(depth);
        snapshot.asks.truncate(depth);
        snapshot
    }

    /// Current ticker.
    pub fn ticker(&self) -> Ticker {
        self.ticker.clone()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}
