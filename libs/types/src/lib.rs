//! Types library for the exchange matching and settlement core
//!
//! This library provides all core type definitions shared across the
//! engine crates, ensuring type safety and deterministic behavior.
//!
//! # Modules
//! - `ids`: Unique identifiers (OrderId, TradeId, UserId, PairId)
//! - `numeric`: Fixed-point decimal types (Price, Quantity)
//! - `order`: Order lifecycle types
//! - `trade`: Trade execution types
//! - `balance`: Per-asset balance with reservation accounting
//! - `pair`: Trading pair metadata and fee schedules
//! - `errors`: Error taxonomy

// Public modules
pub mod balance;
pub mod errors;
pub mod ids;
pub mod numeric;
pub mod order;
pub mod pair;
pub mod trade;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::balance::*;
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::pair::*;
    pub use crate::trade::*;
}

/// Current exchange time as Unix nanoseconds.
///
/// All timestamps in the core are `i64` Unix nanos captured through this
/// single function so tests can reason about one clock source.
pub fn now_nanos() -> i64 {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .expect("timestamp out of range")
}
