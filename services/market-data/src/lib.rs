//! Market Data
//!
//! Derives what external consumers may see from the book and the trade
//! history: aggregated depth, best bid/ask, last price, rolling volume,
//! and a bounded newest-first trade tape.
//!
//! Everything here is a pure function of book snapshot + trades plus a
//! cache; the owning lane refreshes the cache synchronously after every
//! mutating operation, so readers never observe a torn intermediate
//! state.

pub mod depth;
pub mod tape;
pub mod ticker;

pub use depth::DepthSnapshot;
pub use tape::{PublicTrade, TradeTape};
pub use ticker::{MarketDataCache, Ticker};
