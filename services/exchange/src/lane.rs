//! Per-pair execution lane
//!
//! One task per trading pair owns that pair's matching engine, trade
//! tape and intent journal. Commands arrive over an mpsc channel and
//! are processed one at a time to completion, so no two mutating
//! operations for the same pair can interleave their read-modify-write
//! sequences. The shared balance ledger is locked only for the duration
//! of a single reservation, release, or trade settlement.

use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use market_data::{MarketDataCache, TradeTape};
use matching_engine::engine::PairEngine;
use order_store::{IntentJournal, MatchIntent, OrderStore, StoreError};
use settlement::{release_remaining, reservation_for, settle_trade, BalanceLedger};
use types::errors::{ExchangeError, ExchangeResult};
use types::ids::{OrderId, UserId};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};
use types::pair::TradingPair;

/// Attempts per store operation before the failure surfaces.
const STORE_RETRIES: usize = 3;

/// Commands a lane accepts. Each carries a oneshot reply channel.
pub enum LaneCommand {
    Submit {
        user: UserId,
        side: Side,
        price: Price,
        amount: Quantity,
        reply: oneshot::Sender<ExchangeResult<Order>>,
    },
    Cancel {
        order_id: OrderId,
        user: UserId,
        reply: oneshot::Sender<ExchangeResult<Order>>,
    },
}

/// Sender half used by the facade to reach a lane.
#[derive(Clone)]
pub struct LaneHandle {
    tx: mpsc::Sender<LaneCommand>,
}

impl LaneHandle {
    pub async fn submit(
        &self,
        user: UserId,
        side: Side,
        price: Price,
        amount: Quantity,
    ) -> ExchangeResult<Order> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(LaneCommand::Submit {
                user,
                side,
                price,
                amount,
                reply,
            })
            .await
            .map_err(|_| lane_closed())?;
        rx.await.map_err(|_| lane_closed())?
    }

    pub async fn cancel(&self, order_id: OrderId, user: UserId) -> ExchangeResult<Order> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(LaneCommand::Cancel {
                order_id,
                user,
                reply,
            })
            .await
            .map_err(|_| lane_closed())?;
        rx.await.map_err(|_| lane_closed())?
    }
}

fn lane_closed() -> ExchangeError {
    ExchangeError::Store("pair lane unavailable".to_string())
}

/// Lane state owned by the spawned task.
struct Lane {
    pair: TradingPair,
    engine: PairEngine,
    tape: TradeTape,
    journal: IntentJournal,
    ledger: Arc<Mutex<BalanceLedger>>,
    store: Arc<dyn OrderStore>,
    cache: Arc<RwLock<MarketDataCache>>,
    max_depth: usize,
}

/// Spawn the lane task for one pair.
#[allow(clippy::too_many_arguments)]
pub fn spawn(
    pair: TradingPair,
    ledger: Arc<Mutex<BalanceLedger>>,
    store: Arc<dyn OrderStore>,
    cache: Arc<RwLock<MarketDataCache>>,
    journal_path: std::path::PathBuf,
    tape_capacity: usize,
    max_depth: usize,
    buffer: usize,
) -> ExchangeResult<LaneHandle> {
    let journal =
        IntentJournal::open(&journal_path).map_err(|e| ExchangeError::Store(e.to_string()))?;

    let (tx, rx) = mpsc::channel(buffer);
    let lane = Lane {
        engine: PairEngine::new(pair.clone()),
        tape: TradeTape::new(pair.pair.clone(), tape_capacity),
        journal,
        ledger,
        store,
        cache,
        max_depth,
        pair,
    };

    tokio::spawn(run(lane, rx));
    Ok(LaneHandle { tx })
}

/// Lane processing loop: one command at a time, to completion.
async fn run(mut lane: Lane, mut rx: mpsc::Receiver<LaneCommand>) {
    info!(pair = %lane.pair.pair, "lane started");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            LaneCommand::Submit {
                user,
                side,
                price,
                amount,
                reply,
            } => {
                let result = lane.handle_submit(user, side, price, amount);
                if let Err(err) = &result {
                    if matches!(err, ExchangeError::SettlementInvariant { .. }) {
                        error!(pair = %lane.pair.pair, %err, "submission aborted mid-match; reconciliation required");
                    }
                }
                let _ = reply.send(result);
            }
            LaneCommand::Cancel {
                order_id,
                user,
                reply,
            } => {
                let _ = reply.send(lane.handle_cancel(order_id, user));
            }
        }
    }

    info!(pair = %lane.pair.pair, "lane stopped");
}

impl Lane {
    fn handle_submit(
        &mut self,
        user: UserId,
        side: Side,
        price: Price,
        amount: Quantity,
    ) -> ExchangeResult<Order> {
        let ts = types::now_nanos();
        let order = Order::new(user, self.pair.pair.clone(), side, price, amount, ts);

        // Reserve before anything else; a rejection here changes nothing.
        let (asset, reserve_amount) = reservation_for(&order, &self.pair);
        self.ledger
            .lock()
            .expect("ledger mutex poisoned")
            .reserve(user, &asset, reserve_amount)?;

        if let Err(err) = with_retry(|| self.store.insert_order(&order)) {
            // The order never existed as far as matching is concerned;
            // hand the reservation back.
            if let Err(release_err) = self
                .ledger
                .lock()
                .expect("ledger mutex poisoned")
                .release(user, &asset, reserve_amount)
            {
                error!(%release_err, "failed to roll back reservation");
            }
            return Err(err);
        }

        // Each match step is committed (journal, settlement, store)
        // before the engine applies it; a failing step aborts the
        // operation with everything before it intact.
        let Lane {
            pair,
            engine,
            tape,
            journal,
            ledger,
            store,
            ..
        } = self;

        let outcome = engine.submit(order, ts, |step| {
            let intent = MatchIntent {
                trade: step.trade.clone(),
                maker: step.maker.clone(),
                taker: step.taker.clone(),
            };
            journal
                .append_match_step(&intent, ts)
                .map_err(|e| ExchangeError::Store(e.to_string()))?;

            let buyer_limit = match step.trade.taker_side {
                Side::Buy => step.taker.price,
                Side::Sell => step.maker.price,
            };
            {
                let mut ledger = ledger.lock().expect("ledger mutex poisoned");
                settle_trade(&mut ledger, &step.trade, pair, buyer_limit)?;
            }

            with_retry(|| store.apply_match_step(&step.trade, &step.maker, &step.taker))?;
            tape.record(&step.trade);
            Ok(())
        })?;

        self.refresh_cache(ts);
        Ok(outcome.taker)
    }

    fn handle_cancel(&mut self, order_id: OrderId, user: UserId) -> ExchangeResult<Order> {
        let ts = types::now_nanos();

        let cancelled = self.engine.cancel(order_id, user, ts)?;

        // Funds first, then the durable record.
        {
            let mut ledger = self.ledger.lock().expect("ledger mutex poisoned");
            release_remaining(&mut ledger, &cancelled, &self.pair)?;
        }
        with_retry(|| self.store.update_order(&cancelled))?;

        self.refresh_cache(ts);
        Ok(cancelled)
    }

    fn refresh_cache(&mut self, ts: i64) {
        let (bids, asks) = self.engine.depth(self.max_depth);
        self.cache
            .write()
            .expect("cache lock poisoned")
            .refresh(bids, asks, &self.tape, ts);
    }
}

/// Run a store operation, retrying transient failures a bounded number
/// of times. Permanent failures surface immediately.
fn with_retry<T>(mut op: impl FnMut() -> Result<T, StoreError>) -> ExchangeResult<T> {
    let mut last = String::new();
    for attempt in 1..=STORE_RETRIES {
        match op() {
            Ok(value) => return Ok(value),
            Err(StoreError::Transient(msg)) => {
                warn!(attempt, %msg, "transient store failure");
                last = msg;
            }
            Err(StoreError::Permanent(msg)) => {
                return Err(ExchangeError::Store(msg));
            }
        }
    }
    Err(ExchangeError::Store(format!(
        "gave up after {STORE_RETRIES} attempts: {last}"
    )))
}
