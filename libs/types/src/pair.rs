//! Trading pair metadata and fee schedules
//!
//! A `TradingPair` carries the precision and fee metadata the engine needs
//! to validate submissions and settle trades. Pairs are provided by an
//! explicit registry; the core never hardcodes a symbol list.

use crate::errors::ExchangeError;
use crate::ids::PairId;
use crate::numeric::{Price, Quantity};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fee rounding precision in decimal places. Fees round away from zero so
/// the exchange never undercharges.
const FEE_DP: u32 = 8;

/// Maker/taker fee rates for one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub maker_rate: Decimal,
    pub taker_rate: Decimal,
}

impl FeeSchedule {
    pub fn new(maker_rate: Decimal, taker_rate: Decimal) -> Self {
        Self {
            maker_rate,
            taker_rate,
        }
    }

    /// Zero-fee schedule, useful in tests
    pub fn free() -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO)
    }

    /// Fee on a notional value for the maker side
    pub fn maker_fee(&self, notional: Decimal) -> Decimal {
        round_up_fee(notional * self.maker_rate)
    }

    /// Fee on a notional value for the taker side
    pub fn taker_fee(&self, notional: Decimal) -> Decimal {
        round_up_fee(notional * self.taker_rate)
    }
}

/// Round fee away from zero at `FEE_DP` decimal places.
fn round_up_fee(v: Decimal) -> Decimal {
    v.round_dp_with_strategy(FEE_DP, RoundingStrategy::AwayFromZero)
}

/// One tradable market with its precision and fee metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingPair {
    pub pair: PairId,
    /// Maximum decimal places accepted on a limit price
    pub price_scale: u32,
    /// Maximum decimal places accepted on an order amount
    pub amount_scale: u32,
    pub fees: FeeSchedule,
    pub active: bool,
}

impl TradingPair {
    pub fn new(pair: PairId, price_scale: u32, amount_scale: u32, fees: FeeSchedule) -> Self {
        Self {
            pair,
            price_scale,
            amount_scale,
            fees,
            active: true,
        }
    }

    /// Base asset of this pair
    pub fn base(&self) -> &str {
        self.pair.base()
    }

    /// Quote asset of this pair
    pub fn quote(&self) -> &str {
        self.pair.quote()
    }

    /// Validate a limit price and amount against this pair's precision.
    ///
    /// Positivity is already guaranteed by the `Price`/`Quantity` types;
    /// this checks the zero-amount edge and the scale bounds.
    pub fn validate(&self, price: Price, amount: Quantity) -> Result<(), ExchangeError> {
        if amount.is_zero() {
            return Err(ExchangeError::InvalidOrder {
                reason: "amount must be positive".to_string(),
            });
        }
        if price.scale() > self.price_scale {
            return Err(ExchangeError::InvalidOrder {
                reason: format!(
                    "price {} exceeds {} decimal places",
                    price, self.price_scale
                ),
            });
        }
        if amount.scale() > self.amount_scale {
            return Err(ExchangeError::InvalidOrder {
                reason: format!(
                    "amount {} exceeds {} decimal places",
                    amount, self.amount_scale
                ),
            });
        }
        Ok(())
    }
}
