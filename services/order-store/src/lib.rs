//! Order Store
//!
//! Durable record of orders and trades behind a narrow interface, plus
//! the append-only, checksummed intent journal that makes each match
//! step all-or-nothing even without multi-row store transactions.

pub mod journal;
pub mod store;

pub use journal::{IntentJournal, JournalEntry, JournalError, MatchIntent};
pub use store::{MemoryStore, OrderStore, StoreError, StoreResult};
