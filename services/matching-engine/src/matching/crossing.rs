//! Crossing detection
//!
//! A bid and an ask can match when the bid price is at or above the ask
//! price. The trade then executes at the resting order's price.

use types::numeric::Price;
use types::order::Side;

/// Check if a bid and ask price are compatible.
pub fn can_match(bid_price: Price, ask_price: Price) -> bool {
    bid_price >= ask_price
}

/// Check if an incoming limit order crosses a resting order's price.
pub fn incoming_can_match(incoming_side: Side, incoming_price: Price, resting_price: Price) -> bool {
    match incoming_side {
        Side::Buy => incoming_price >= resting_price,
        Side::Sell => incoming_price <= resting_price,
    }
}
