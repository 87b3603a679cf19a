//! Error taxonomy for the matching and settlement core
//!
//! Every rejection the core can report to a caller, using thiserror.
//! Variants carry the offending values so callers can render precise
//! messages without re-querying state.

use rust_decimal::Decimal;
use thiserror::Error;

/// Top-level error for all public engine operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExchangeError {
    /// Malformed submission: non-positive or over-precise price/amount.
    /// Rejected before any state change.
    #[error("invalid order: {reason}")]
    InvalidOrder { reason: String },

    /// Pair not registered, or registered but inactive.
    #[error("unknown or inactive pair: {pair}")]
    UnknownPair { pair: String },

    /// The caller's available balance cannot cover the order reservation.
    #[error("insufficient balance for {asset}: required {required}, available {available}")]
    InsufficientBalance {
        asset: String,
        required: Decimal,
        available: Decimal,
    },

    /// Target order absent, not owned by the caller, or no longer open.
    #[error("order not found or not cancellable: {order_id}")]
    NotFound { order_id: String },

    /// A matched trade could not be settled because reserved funds were
    /// missing. Fatal to the operation; surfaced for reconciliation and
    /// never silently swallowed.
    #[error("settlement invariant violated: {detail}")]
    SettlementInvariant { detail: String },

    /// Durable store failure that survived the bounded retry policy.
    #[error("store error: {0}")]
    Store(String),
}

/// Convenience result alias used across the engine crates.
pub type ExchangeResult<T> = Result<T, ExchangeError>;
