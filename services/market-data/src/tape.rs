//! Trade tape
//!
//! Bounded, newest-first history of public trade events for one pair.
//! Account references are stripped: a public trade carries only what any
//! market participant may see.

use std::collections::VecDeque;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::ids::{PairId, TradeId};
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::trade::Trade;

/// A public trade event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicTrade {
    pub trade_id: TradeId,
    /// Per-pair monotonic trade sequence
    pub sequence: u64,
    pub pair: PairId,
    pub price: Price,
    pub amount: Quantity,
    /// Trade value (price × amount)
    pub value: Decimal,
    /// BUY = buyer was taker, SELL = seller was taker
    pub taker_side: Side,
    pub executed_at: i64,
}

impl From<&Trade> for PublicTrade {
    fn from(trade: &Trade) -> Self {
        Self {
            trade_id: trade.trade_id,
            sequence: trade.sequence,
            pair: trade.pair.clone(),
            price: trade.price,
            amount: trade.amount,
            value: trade.value(),
            taker_side: trade.taker_side,
            executed_at: trade.executed_at,
        }
    }
}

/// Bounded trade history for one pair.
#[derive(Debug)]
pub struct TradeTape {
    pair: PairId,
    history: VecDeque<PublicTrade>,
    max_history: usize,
}

impl TradeTape {
    pub fn new(pair: PairId, max_history: usize) -> Self {
        Self {
            pair,
            history: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    /// Record an executed trade, evicting the oldest if at capacity.
    pub fn record(&mut self, trade: &Trade) -> PublicTrade {
        debug_assert_eq!(trade.pair, self.pair);
        let public = PublicTrade::from(trade);

        if self.history.len() >= self.max_history {
            self.history.pop_front();
        }
        self.history.push_back(public.clone());
        public
    }

    /// Most recent trades, newest first, up to `limit`.
    pub fn recent(&self, limit: usize) -> Vec<PublicTrade> {
        self.history.iter().rev().take(limit).cloned().collect()
    }

    /// Price of the most recent trade.
    pub fn last_price(&self) -> Option<Price> {
        self.history.back().map(|t| t.price)
    }

    /// Base and quote volume over trades at or after `since` (Unix nanos).
    pub fn rolling_volume(&self, since: i64) -> (Decimal, Decimal) {
        self.history
            .iter()
            .rev()
            .take_while(|t| t.executed_at >= since)
            .fold((Decimal::ZERO, Decimal::ZERO), |(base, quote), t| {
                (base + t.amount.as_decimal(), quote + t.value)
            })
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn pair(&self) -> &PairId {
        &self.pair
    }
}
