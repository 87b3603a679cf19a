//! Exchange facade
//!
//! The entry point callers (the web/API layer) use: pair registry,
//! per-pair execution lanes, and the public submit/cancel/read API.
//!
//! # Concurrency model
//!
//! Every trading pair owns one **lane**: a spawned task that owns the
//! pair's matching engine, trade tape and intent journal, fed through an
//! mpsc channel. All mutating operations for a pair are funneled through
//! its lane and processed one at a time to completion, which makes the
//! pair's behavior linearizable; lanes for different pairs run in
//! parallel. Market-data reads come from a snapshot cache the lane
//! republishes after every completed mutation, so readers never block a
//! lane and never see a torn state.

pub mod config;
pub mod exchange;
pub mod lane;
pub mod registry;

pub use crate::config::ExchangeConfig;
pub use crate::exchange::Exchange;
pub use crate::registry::PairRegistry;
