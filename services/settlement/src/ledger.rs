//! Balance ledger
//!
//! Per-user, per-asset balances with reservation accounting. The ledger
//! is mutated only through the pair lanes (reservations, settlement,
//! cancel releases) and through the deposit/withdraw operations exposed
//! to the out-of-scope custody layer.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;
use types::balance::Balance;
use types::errors::{ExchangeError, ExchangeResult};
use types::ids::UserId;

/// All user balances plus the exchange's fee-collector account.
#[derive(Debug)]
pub struct BalanceLedger {
    accounts: HashMap<UserId, HashMap<String, Balance>>,
    fee_collector: UserId,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            fee_collector: UserId::new(),
        }
    }

    /// The account collecting trade fees.
    pub fn fee_collector(&self) -> UserId {
        self.fee_collector
    }

    /// Read a user's balance for an asset, if any.
    pub fn balance(&self, user: &UserId, asset: &str) -> Option<&Balance> {
        self.accounts.get(user).and_then(|a| a.get(asset))
    }

    /// A user's available (unreserved) funds for an asset.
    pub fn available(&self, user: &UserId, asset: &str) -> Decimal {
        self.balance(user, asset)
            .map(|b| b.available)
            .unwrap_or(Decimal::ZERO)
    }

    /// A user's reserved funds for an asset.
    pub fn locked(&self, user: &UserId, asset: &str) -> Decimal {
        self.balance(user, asset)
            .map(|b| b.locked)
            .unwrap_or(Decimal::ZERO)
    }

    fn entry(&mut self, user: UserId, asset: &str) -> &mut Balance {
        self.accounts
            .entry(user)
            .or_default()
            .entry(asset.to_string())
            .or_insert_with(|| Balance::empty(asset))
    }

    /// Credit funds into a user's available balance.
    pub fn deposit(&mut self, user: UserId, asset: &str, amount: Decimal) -> ExchangeResult<()> {
        if amount <= Decimal::ZERO {
            return Err(ExchangeError::InvalidOrder {
                reason: "deposit amount must be positive".to_string(),
            });
        }
        self.entry(user, asset).credit(amount);
        debug!(%user, asset, %amount, "deposit credited");
        Ok(())
    }

    /// Withdraw from a user's available balance.
    ///
    /// Reserved funds are never withdrawable.
    pub fn withdraw(&mut self, user: UserId, asset: &str, amount: Decimal) -> ExchangeResult<()> {
        if amount <= Decimal::ZERO {
            return Err(ExchangeError::InvalidOrder {
                reason: "withdrawal amount must be positive".to_string(),
            });
        }
        let available = self.available(&user, asset);
        if available < amount {
            return Err(ExchangeError::InsufficientBalance {
                asset: asset.to_string(),
                required: amount,
                available,
            });
        }
        self.entry(user, asset).debit_available(amount);
        debug!(%user, asset, %amount, "withdrawal debited");
        Ok(())
    }

    /// Reserve funds for a new order.
    ///
    /// Fails with `InsufficientBalance` and no state change if the
    /// user's available balance cannot cover the reservation.
    pub fn reserve(&mut self, user: UserId, asset: &str, amount: Decimal) -> ExchangeResult<()> {
        let available = self.available(&user, asset);
        if available < amount {
            return Err(ExchangeError::InsufficientBalance {
                asset: asset.to_string(),
                required: amount,
                available,
            });
        }
        self.entry(user, asset).lock(amount);
        Ok(())
    }

    /// Release previously reserved funds back to available.
    ///
    /// A release exceeding the user's locked funds is an accounting
    /// breach, reported as `SettlementInvariant`.
    pub fn release(&mut self, user: UserId, asset: &str, amount: Decimal) -> ExchangeResult<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let locked = self.locked(&user, asset);
        if locked < amount {
            return Err(ExchangeError::SettlementInvariant {
                detail: format!(
                    "release of {} {} exceeds locked {} for {}",
                    amount, asset, locked, user
                ),
            });
        }
        self.entry(user, asset).unlock(amount);
        Ok(())
    }

    /// Spend reserved funds (settlement debit). Caller must have verified
    /// the locked amount covers it.
    pub(crate) fn spend_locked(&mut self, user: UserId, asset: &str, amount: Decimal) {
        self.entry(user, asset).deduct_locked(amount);
    }

    /// Credit settlement proceeds to available.
    pub(crate) fn credit(&mut self, user: UserId, asset: &str, amount: Decimal) {
        self.entry(user, asset).credit(amount);
    }

    /// Sum of all users' total balances for an asset, fee collector
    /// included. Used by conservation checks.
    pub fn asset_supply(&self, asset: &str) -> Decimal {
        self.accounts
            .values()
            .filter_map(|a| a.get(asset))
            .map(|b| b.total)
            .sum()
    }
}

impl Default for BalanceLedger {
    fn default() -> Self {
        Self::new()
    }
}
