//! Per-pair matching engine
//!
//! Owns one pair's order book plus the full records of every resting
//! order, and runs the match loop for incoming submissions.
//!
//! Persistence and settlement are not this crate's business: the caller
//! passes a `commit` callback to [`PairEngine::submit`], invoked once per
//! match step *before* the step is applied in memory. If the callback
//! fails, that step (and everything after it) never happens, while
//! previously committed steps stand, so engine state and the caller's
//! durable state can never disagree about a trade.

use std::collections::HashMap;

use tracing::{debug, instrument};
use types::errors::{ExchangeError, ExchangeResult};
use types::ids::{OrderId, UserId};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};
use types::pair::TradingPair;
use types::trade::Trade;

use crate::book::OrderBook;
use crate::matching::crossing::incoming_can_match;
use crate::matching::executor::TradeFactory;

/// One match step: the trade plus both orders' post-step state.
///
/// Carries everything a caller needs to persist the step as a single
/// transactional unit (trade insert + both fill updates + settlement).
#[derive(Debug, Clone)]
pub struct MatchStep {
    pub trade: Trade,
    /// Resting order after this step's fill
    pub maker: Order,
    /// Incoming order after this step's fill
    pub taker: Order,
}

/// Result of a completed submission.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// The incoming order's final state
    pub taker: Order,
    /// Trades produced, in match order
    pub trades: Vec<Trade>,
    /// Whether a remainder was left resting on the book
    pub rested: bool,
}

/// Matching engine for a single trading pair.
pub struct PairEngine {
    pair: TradingPair,
    book: OrderBook,
    /// Full records of resting orders, keyed by id
    orders: HashMap<OrderId, Order>,
    factory: TradeFactory,
}

impl PairEngine {
    /// Create an engine for a pair, starting trade sequencing at zero.
    pub fn new(pair: TradingPair) -> Self {
        Self::with_sequence(pair, 0)
    }

    /// Create an engine resuming from a known trade sequence.
    pub fn with_sequence(pair: TradingPair, starting_sequence: u64) -> Self {
        let book = OrderBook::new(pair.pair.clone());
        let factory = TradeFactory::new(pair.pair.clone(), pair.fees.clone(), starting_sequence);
        Self {
            pair,
            book,
            orders: HashMap::new(),
            factory,
        }
    }

    /// Pair metadata this engine serves.
    pub fn pair(&self) -> &TradingPair {
        &self.pair
    }

    /// Read access to the book (snapshots, best prices).
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Look up a resting order by id.
    pub fn open_order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// Match an incoming order against the book.
    ///
    /// `commit` is called once per match step before the step is applied;
    /// returning an error aborts the operation at that step. On success
    /// any remainder rests on the book.
    #[instrument(skip_all, fields(pair = %self.pair.pair, order = %taker.order_id))]
    pub fn submit<F>(
        &mut self,
        mut taker: Order,
        timestamp: i64,
        mut commit: F,
    ) -> ExchangeResult<MatchOutcome>
    where
        F: FnMut(&MatchStep) -> ExchangeResult<()>,
    {
        if taker.pair != self.pair.pair {
            return Err(ExchangeError::InvalidOrder {
                reason: format!(
                    "order pair {} does not match engine pair {}",
                    taker.pair, self.pair.pair
                ),
            });
        }

        let mut trades = Vec::new();

        while !taker.remaining().is_zero() {
            let Some(entry) = self.book.best_opposite(taker.side) else {
                break;
            };
            if !incoming_can_match(taker.side, taker.price, entry.price) {
                break;
            }

            let fill = taker.remaining().min(entry.remaining);
            let trade = self.factory.execute(&taker, &entry, fill, timestamp);

            // Compute both orders' post-step state before touching anything.
            let mut maker = self
                .orders
                .get(&entry.order_id)
                .cloned()
                .expect("book entry without order record");
            maker.add_fill(fill, timestamp);

            let mut taker_after = taker.clone();
            taker_after.add_fill(fill, timestamp);

            let step = MatchStep {
                trade,
                maker: maker.clone(),
                taker: taker_after.clone(),
            };
            commit(&step)?;

            // Step committed durably; now apply it in memory.
            taker = taker_after;
            match taker.side {
                Side::Buy => self.book.asks_mut().fill_best(fill),
                Side::Sell => self.book.bids_mut().fill_best(fill),
            }
            if maker.is_filled() {
                self.orders.remove(&maker.order_id);
            } else {
                self.orders.insert(maker.order_id, maker);
            }

            debug!(
                trade = %step.trade.trade_id,
                price = %step.trade.price,
                amount = %step.trade.amount,
                "match step applied"
            );
            trades.push(step.trade);
        }

        let rested = !taker.remaining().is_zero();
        if rested {
            self.book.insert(&taker)?;
            self.orders.insert(taker.order_id, taker.clone());
        }

        debug_assert!(!self.book.is_crossed(), "book left crossable");

        Ok(MatchOutcome {
            taker,
            trades,
            rested,
        })
    }

    /// Cancel a resting order owned by `requester`.
    ///
    /// Fails with `NotFound` if the order is absent, belongs to someone
    /// else, or has already reached a terminal status. Cancellation is
    /// an atomic check against the current status, so an order consumed
    /// by a concurrent submission is simply no longer cancellable.
    #[instrument(skip(self), fields(pair = %self.pair.pair))]
    pub fn cancel(
        &mut self,
        order_id: OrderId,
        requester: UserId,
        timestamp: i64,
    ) -> ExchangeResult<Order> {
        let owned = self
            .orders
            .get(&order_id)
            .map(|o| o.user_id == requester && o.status.is_resting())
            .unwrap_or(false);
        if !owned {
            return Err(ExchangeError::NotFound {
                order_id: order_id.to_string(),
            });
        }

        let mut order = self
            .orders
            .remove(&order_id)
            .expect("checked above");
        order.cancel(timestamp);
        self.book.remove(&order_id);

        debug!(order = %order_id, "order cancelled");
        Ok(order)
    }

    /// Aggregated depth snapshot, best prices first.
    pub fn depth(&self, depth: usize) -> (Vec<(Price, Quantity)>, Vec<(Price, Quantity)>) {
        self.book.snapshot(depth)
    }
}
