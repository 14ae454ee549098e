//! ENFORCED WALLET TYPE
//!
//! The single source of truth for one account's balance.
//! ALL balance mutations MUST go through these methods.
//!
//! # Enforcement Strategy:
//! 1. Fields are PRIVATE - no direct access
//! 2. All mutations return Result - errors are explicit
//! 3. Version auto-increments - optimistic-concurrency callers can detect
//!    lost updates
//! 4. Checked arithmetic - overflow protection

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::LedgerError;
use crate::core_types::{UserId, WalletId};
use crate::money::Currency;

/// Balance-holding wallet
///
/// # Invariants (ENFORCED by private fields):
/// - `balance >= 0` always; a debit below zero fails and leaves the wallet
///   untouched
/// - `version` increments on every successful mutation
/// - `currency` is immutable after creation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Wallet {
    id: WalletId,
    owner_id: UserId,
    balance: Decimal,
    currency: Currency,
    version: u64,
    updated_at: i64,
}

impl Wallet {
    pub fn new(id: WalletId, owner_id: UserId, currency: Currency) -> Self {
        Self::with_balance(id, owner_id, currency, Decimal::ZERO)
    }

    pub fn with_balance(
        id: WalletId,
        owner_id: UserId,
        currency: Currency,
        balance: Decimal,
    ) -> Self {
        Self {
            id,
            owner_id,
            balance,
            currency,
            version: 0,
            updated_at: Utc::now().timestamp_millis(),
        }
    }

    // ============================================================
    // READ-ONLY GETTERS (safe to expose)
    // ============================================================

    #[inline(always)]
    pub fn id(&self) -> WalletId {
        self.id
    }

    #[inline(always)]
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    #[inline(always)]
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    #[inline(always)]
    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    #[inline(always)]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline(always)]
    pub fn updated_at(&self) -> i64 {
        self.updated_at
    }

    // ============================================================
    // VALIDATED MUTATIONS (crate-private: WalletLedger is the
    // single writer)
    // ============================================================

    /// Credit funds to the balance.
    ///
    /// # Effects
    /// - Increases balance by amount
    /// - Increments version, stamps updated_at
    pub(crate) fn credit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { wallet_id: self.id })?;
        self.touch();
        Ok(())
    }

    /// Debit funds from the balance.
    ///
    /// # Errors
    /// - `InsufficientFunds` if the debit would drive the balance below
    ///   zero; the wallet is untouched
    ///
    /// # Effects
    /// - Decreases balance by amount
    /// - Increments version, stamps updated_at
    pub(crate) fn debit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if self.balance < amount {
            return Err(LedgerError::InsufficientFunds { wallet_id: self.id });
        }
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow { wallet_id: self.id })?;
        if self.balance < Decimal::ZERO {
            // Precondition passed but balance went negative anyway:
            // a missed serialization, not a user error.
            return Err(LedgerError::InvariantViolation(format!(
                "wallet {} balance negative after debit",
                self.id
            )));
        }
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
        self.updated_at = Utc::now().timestamp_millis();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn wallet() -> Wallet {
        Wallet::with_balance(1, 100, Currency::new("USD"), dec!(1000))
    }

    #[test]
    fn test_credit() {
        let mut w = wallet();
        w.credit(dec!(250)).unwrap();
        assert_eq!(w.balance(), dec!(1250));
        assert_eq!(w.version(), 1);
    }

    #[test]
    fn test_debit() {
        let mut w = wallet();
        w.debit(dec!(400)).unwrap();
        assert_eq!(w.balance(), dec!(600));
        assert_eq!(w.version(), 1);
    }

    #[test]
    fn test_debit_insufficient_leaves_wallet_untouched() {
        let mut w = wallet();
        let err = w.debit(dec!(1500)).unwrap_err();
        assert_eq!(err, LedgerError::InsufficientFunds { wallet_id: 1 });
        assert_eq!(w.balance(), dec!(1000));
        assert_eq!(w.version(), 0);
    }

    #[test]
    fn test_debit_to_zero_is_allowed() {
        let mut w = wallet();
        w.debit(dec!(1000)).unwrap();
        assert_eq!(w.balance(), Decimal::ZERO);
    }

    #[test]
    fn test_version_increments_per_mutation() {
        let mut w = wallet();
        w.credit(dec!(1)).unwrap();
        w.debit(dec!(1)).unwrap();
        w.credit(dec!(1)).unwrap();
        assert_eq!(w.version(), 3);
    }

    #[test]
    fn test_currency_immutable() {
        let w = wallet();
        assert_eq!(w.currency(), &Currency::new("usd"));
    }
}
