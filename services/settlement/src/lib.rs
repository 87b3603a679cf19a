//! Settlement
//!
//! The balance ledger and the per-trade transfer that moves traded
//! amounts and proceeds between buyer and seller.
//!
//! Settlement is where correctness is most at risk: every trade must
//! apply both legs or neither. The settler therefore verifies every
//! debit against reserved funds *before* mutating any balance; a failed
//! verification surfaces as `SettlementInvariant` with the ledger
//! untouched.

pub mod ledger;
pub mod settler;

pub use ledger::BalanceLedger;
pub use settler::{release_remaining, reservation_for, settle_trade};
