//! Trade construction
//!
//! Builds `Trade` records for match steps, assigning the per-pair
//! monotonic sequence and computing both parties' fees from the pair's
//! schedule. Fees are charged in the asset each party receives: the
//! buyer's fee in base units, the seller's fee in quote units.

use types::ids::PairId;
use types::numeric::Quantity;
use types::order::{Order, Side};
use types::pair::FeeSchedule;
use types::trade::Trade;

use crate::book::BookEntry;

/// Per-pair trade factory with monotonic sequencing.
#[derive(Debug)]
pub struct TradeFactory {
    pair: PairId,
    fees: FeeSchedule,
    sequence: u64,
}

impl TradeFactory {
    /// Create a factory starting at the given sequence number.
    pub fn new(pair: PairId, fees: FeeSchedule, starting_sequence: u64) -> Self {
        Self {
            pair,
            fees,
            sequence: starting_sequence,
        }
    }

    /// Next sequence number (monotonically increasing).
    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Last assigned sequence number.
    pub fn current_sequence(&self) -> u64 {
        self.sequence
    }

    /// Build the trade for one match step.
    ///
    /// `taker` is the incoming order, `maker` the resting entry it
    /// consumed. The execution price is always the maker's price.
    pub fn execute(
        &mut self,
        taker: &Order,
        maker: &BookEntry,
        amount: Quantity,
        timestamp: i64,
    ) -> Trade {
        let price = maker.price;
        let notional = amount.as_decimal() * price.as_decimal();

        // Maker fee applies to whoever rested; taker fee to whoever crossed.
        // The buyer's fee is denominated in base, the seller's in quote.
        let (buy_order_id, sell_order_id, buyer, seller) = match taker.side {
            Side::Buy => (taker.order_id, maker.order_id, taker.user_id, maker.user_id),
            Side::Sell => (maker.order_id, taker.order_id, maker.user_id, taker.user_id),
        };
        let (buyer_fee, seller_fee) = match taker.side {
            // Buyer takes: taker fee on the base received, maker fee on quote proceeds
            Side::Buy => (
                self.fees.taker_fee(amount.as_decimal()),
                self.fees.maker_fee(notional),
            ),
            // Seller takes: maker fee on the base received, taker fee on quote proceeds
            Side::Sell => (
                self.fees.maker_fee(amount.as_decimal()),
                self.fees.taker_fee(notional),
            ),
        };

        Trade::new(
            self.next_sequence(),
            self.pair.clone(),
            buy_order_id,
            sell_order_id,
            buyer,
            seller,
            taker.side,
            price,
            amount,
            buyer_fee,
            seller_fee,
            timestamp,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use types::ids::{OrderId, UserId};
    use types::numeric::Price;

    fn factory() -> TradeFactory {
        TradeFactory::new(
            PairId::new("BTC/USDT"),
            FeeSchedule::new(
                Decimal::from_str_exact("0.0002").unwrap(),
                Decimal::from_str_exact("0.0005").unwrap(),
            ),
            1000,
        )
    }

    fn taker(side: Side, price: u64, amount: &str) -> Order {
        Order::new(
            UserId::new(),
            PairId::new("BTC/USDT"),
            side,
            Price::from_u64(price),
            Quantity::from_str(amount).unwrap(),
            100,
        )
    }

    fn maker_entry(price: u64, remaining: &str) -> BookEntry {
        BookEntry {
            order_id: OrderId::new(),
            user_id: UserId::new(),
            price: Price::from_u64(price),
            remaining: Quantity::from_str(remaining).unwrap(),
            created_at: 50,
        }
    }

    #[test]
    fn test_trade_at_maker_price() {
        let mut factory = factory();
        let taker = taker(Side::Buy, 50200, "1.0");
        let maker = maker_entry(50000, "1.0");

        let trade = factory.execute(&taker, &maker, Quantity::from_u64(1), 200);
        assert_eq!(trade.price, Price::from_u64(50000));
        assert_eq!(trade.taker_side, Side::Buy);
        assert_eq!(trade.buy_order_id, taker.order_id);
        assert_eq!(trade.sell_order_id, maker.order_id);
    }

    #[test]
    fn test_sequence_monotonic() {
        let mut factory = factory();
        let taker = taker(Side::Buy, 50000, "2.0");
        let maker = maker_entry(50000, "2.0");

        let t1 = factory.execute(&taker, &maker, Quantity::from_u64(1), 200);
        let t2 = factory.execute(&taker, &maker, Quantity::from_u64(1), 201);
        assert_eq!(t1.sequence, 1001);
        assert_eq!(t2.sequence, 1002);
        assert_eq!(factory.current_sequence(), 1002);
    }

    #[test]
    fn test_fees_follow_taker_side() {
        let mut factory = factory();

        // Buyer takes: buyer pays taker rate on base, seller maker rate on quote
        let buy = taker(Side::Buy, 50000, "1.0");
        let maker = maker_entry(50000, "1.0");
        let trade = factory.execute(&buy, &maker, Quantity::from_u64(1), 200);
        assert_eq!(trade.buyer_fee, Decimal::from_str_exact("0.0005").unwrap());
        assert_eq!(trade.seller_fee, Decimal::from(10)); // 50000 × 0.0002

        // Seller takes: mirrored
        let sell = taker(Side::Sell, 50000, "1.0");
        let bid = maker_entry(50000, "1.0");
        let trade = factory.execute(&sell, &bid, Quantity::from_u64(1), 201);
        assert_eq!(trade.buyer_fee, Decimal::from_str_exact("0.0002").unwrap());
        assert_eq!(trade.seller_fee, Decimal::from(25)); // 50000 × 0.0005
    }
}
