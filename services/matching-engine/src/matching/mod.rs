//! Matching logic
//!
//! Crossing detection and trade construction for the match loop.

pub mod crossing;
pub mod executor;

pub use crossing::incoming_can_match;
pub use executor::TradeFactory;
