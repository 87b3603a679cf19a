//! Trade execution types
//!
//! A trade records one match between a buy order and a sell order. It is
//! created exactly once per match step and is immutable afterwards.

use crate::ids::{OrderId, PairId, TradeId, UserId};
use crate::numeric::{Price, Quantity};
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An executed trade between two orders.
///
/// `price` is always the resting (maker) order's price. `taker_side` says
/// which side crossed the book: `Buy` means the buyer was the taker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    /// Per-pair monotonic sequence number
    pub sequence: u64,
    pub pair: PairId,

    // Order references
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,

    // Account references
    pub buyer: UserId,
    pub seller: UserId,

    pub taker_side: Side,
    pub price: Price,
    pub amount: Quantity,

    /// Fee charged to the buyer, denominated in the base asset
    pub buyer_fee: Decimal,
    /// Fee charged to the seller, denominated in the quote asset
    pub seller_fee: Decimal,

    /// Execution timestamp (Unix nanos)
    pub executed_at: i64,
}

impl Trade {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        pair: PairId,
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        buyer: UserId,
        seller: UserId,
        taker_side: Side,
        price: Price,
        amount: Quantity,
        buyer_fee: Decimal,
        seller_fee: Decimal,
        executed_at: i64,
    ) -> Self {
        Self {
            trade_id: TradeId::new(),
            sequence,
            pair,
            buy_order_id,
            sell_order_id,
            buyer,
            seller,
            taker_side,
            price,
            amount,
            buyer_fee,
            seller_fee,
            executed_at,
        }
    }

    /// Trade value in quote units (price × amount)
    pub fn value(&self) -> Decimal {
        self.amount.as_decimal() * self.price.as_decimal()
    }

    /// The order that triggered this trade
    pub fn taker_order_id(&self) -> OrderId {
        match self.taker_side {
            Side::Buy => self.buy_order_id,
            Side::Sell => self.sell_order_id,
        }
    }

    /// The resting order consumed by this trade
    pub fn maker_order_id(&self) -> OrderId {
        match self.taker_side {
            Side::Buy => self.sell_order_id,
            Side::Sell => self.buy_order_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trade() -> Trade {
        Trade::new(
            42,
            PairId::new("BTC/USDT"),
            OrderId::new(),
            OrderId::new(),
            UserId::new(),
            UserId::new(),
            Side::Buy,
            Price::from_u64(50000),
            Quantity::from_str("0.5").unwrap(),
            Decimal::ZERO,
            Decimal::from(25),
            1_708_123_456_789_000_000,
        )
    }

    #[test]
    fn test_trade_value() {
        let trade = sample_trade();
        assert_eq!(trade.value(), Decimal::from(25000));
    }

    #[test]
    fn test_taker_maker_references() {
        let trade = sample_trade();
        assert_eq!(trade.taker_order_id(), trade.buy_order_id);
        assert_eq!(trade.maker_order_id(), trade.sell_order_id);
    }

    #[test]
    fn test_trade_serialization() {
        let trade = sample_trade();
        let json = serde_json::to_string(&trade).unwrap();
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, back);
    }
}
