//! Per-trade settlement
//!
//! Moves the traded base amount and quote proceeds between buyer and
//! seller, charges fees to the fee collector, and releases the buyer's
//! over-reservation when a trade executes below the buy limit.
//!
//! The transfer is atomic per trade: every debit is verified against the
//! reserved funds before any balance is touched. Reservation happens at
//! order placement, so a failed verification means the ledger and the
//! book disagree; that is a reconciliation case, reported loudly and
//! never retried silently.

use rust_decimal::Decimal;
use tracing::{debug, error};
use types::errors::{ExchangeError, ExchangeResult};
use types::numeric::Price;
use types::order::{Order, Side};
use types::pair::TradingPair;
use types::trade::Trade;

use crate::ledger::BalanceLedger;

/// The asset and amount an order must reserve at placement.
///
/// A buy reserves `amount × limit price` of quote; a sell reserves
/// `amount` of base.
pub fn reservation_for(order: &Order, pair: &TradingPair) -> (String, Decimal) {
    match order.side {
        Side::Buy => (
            pair.quote().to_string(),
            order.amount.as_decimal() * order.price.as_decimal(),
        ),
        Side::Sell => (pair.base().to_string(), order.amount.as_decimal()),
    }
}

/// Release the reservation still held by an order's unfilled remainder
/// (cancellation path).
pub fn release_remaining(
    ledger: &mut BalanceLedger,
    order: &Order,
    pair: &TradingPair,
) -> ExchangeResult<()> {
    let remaining = order.remaining().as_decimal();
    match order.side {
        Side::Buy => ledger.release(
            order.user_id,
            pair.quote(),
            remaining * order.price.as_decimal(),
        ),
        Side::Sell => ledger.release(order.user_id, pair.base(), remaining),
    }
}

/// Apply one trade to both parties' balances.
///
/// `buyer_limit` is the buy order's limit price, needed to release the
/// difference between what the buyer reserved for this amount and what
/// the trade actually cost.
pub fn settle_trade(
    ledger: &mut BalanceLedger,
    trade: &Trade,
    pair: &TradingPair,
    buyer_limit: Price,
) -> ExchangeResult<()> {
    let base = pair.base();
    let quote = pair.quote();

    let amount = trade.amount.as_decimal();
    let value = trade.value();
    let buyer_reserved = amount * buyer_limit.as_decimal();
    let over_reservation = buyer_reserved - value;

    // Verify every leg before touching any balance.
    if over_reservation < Decimal::ZERO {
        return fail(format!(
            "trade {} executed above the buy limit {}",
            trade.trade_id, buyer_limit
        ));
    }
    if trade.buyer_fee > amount {
        return fail(format!(
            "buyer fee {} exceeds base proceeds {}",
            trade.buyer_fee, amount
        ));
    }
    if trade.seller_fee > value {
        return fail(format!(
            "seller fee {} exceeds quote proceeds {}",
            trade.seller_fee, value
        ));
    }
    if ledger.locked(&trade.buyer, quote) < buyer_reserved {
        return fail(format!(
            "buyer {} reserved {} {} but holds {} locked",
            trade.buyer,
            buyer_reserved,
            quote,
            ledger.locked(&trade.buyer, quote)
        ));
    }
    if ledger.locked(&trade.seller, base) < amount {
        return fail(format!(
            "seller {} reserved {} {} but holds {} locked",
            trade.seller,
            amount,
            base,
            ledger.locked(&trade.seller, base)
        ));
    }

    // All legs verified; apply the transfer.
    let fee_collector = ledger.fee_collector();

    ledger.spend_locked(trade.buyer, quote, value);
    if over_reservation > Decimal::ZERO {
        ledger
            .release(trade.buyer, quote, over_reservation)
            .expect("verified above");
    }
    ledger.spend_locked(trade.seller, base, amount);

    ledger.credit(trade.seller, quote, value - trade.seller_fee);
    ledger.credit(trade.buyer, base, amount - trade.buyer_fee);

    if trade.seller_fee > Decimal::ZERO {
        ledger.credit(fee_collector, quote, trade.seller_fee);
    }
    if trade.buyer_fee > Decimal::ZERO {
        ledger.credit(fee_collector, base, trade.buyer_fee);
    }

    debug!(
        trade = %trade.trade_id,
        %value,
        %amount,
        "trade settled"
    );
    Ok(())
}

fn fail(detail: String) -> ExchangeResult<()> {
    error!(%detail, "settlement invariant violated");
    Err(ExchangeError::SettlementInvariant { detail })
}
