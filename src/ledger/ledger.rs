//! WalletLedger - the single writer for all balances
//!
//! Each wallet is a serialization unit: a `Mutex` guards every wallet entry
//! and all mutation happens inside that critical section. Mutations are
//! tagged with a caller-supplied `reference`; a repeated reference is a
//! no-op that returns the receipt of the first application, which is what
//! makes settlement replays safe.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::{debug, error};

use super::error::LedgerError;
use super::wallet::Wallet;
use crate::core_types::{UserId, WalletId};
use crate::money::Currency;

/// Direction of a ledger mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Debit,
    Credit,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Debit => "DEBIT",
            MutationKind::Credit => "CREDIT",
        }
    }
}

/// Outcome of one applied mutation.
///
/// Stored per wallet under its reference; a replayed call gets the stored
/// receipt back with `replayed = true` and no balance change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerReceipt {
    pub wallet_id: WalletId,
    pub kind: MutationKind,
    pub amount: Decimal,
    pub reference: String,
    pub balance_after: Decimal,
    pub version: u64,
    pub replayed: bool,
}

struct WalletEntry {
    wallet: Wallet,
    /// reference -> receipt of the mutation already applied under it
    applied: HashMap<String, LedgerReceipt>,
}

impl WalletEntry {
    fn apply(
        &mut self,
        kind: MutationKind,
        amount: Decimal,
        reference: &str,
    ) -> Result<LedgerReceipt, LedgerError> {
        match kind {
            MutationKind::Debit => self.wallet.debit(amount)?,
            MutationKind::Credit => self.wallet.credit(amount)?,
        }
        let receipt = LedgerReceipt {
            wallet_id: self.wallet.id(),
            kind,
            amount,
            reference: reference.to_string(),
            balance_after: self.wallet.balance(),
            version: self.wallet.version(),
            replayed: false,
        };
        self.applied.insert(reference.to_string(), receipt.clone());
        Ok(receipt)
    }

    /// Prior receipt under `reference`, verified against the attempted
    /// mutation. A reference reused with a different payload is a
    /// correctness bug, not a replay.
    fn replay(
        &self,
        kind: MutationKind,
        amount: Decimal,
        reference: &str,
    ) -> Result<Option<LedgerReceipt>, LedgerError> {
        match self.applied.get(reference) {
            None => Ok(None),
            Some(prior) if prior.kind == kind && prior.amount == amount => {
                let mut receipt = prior.clone();
                receipt.replayed = true;
                Ok(Some(receipt))
            }
            Some(prior) => Err(LedgerError::InvariantViolation(format!(
                "reference {} reused with different payload on wallet {} ({} {} vs {} {})",
                reference,
                self.wallet.id(),
                prior.kind.as_str(),
                prior.amount,
                kind.as_str(),
                amount,
            ))),
        }
    }
}

/// Owns every wallet and all balance mutation primitives.
pub struct WalletLedger {
    wallets: DashMap<WalletId, Arc<Mutex<WalletEntry>>>,
    next_id: AtomicU64,
}

impl WalletLedger {
    pub fn new() -> Self {
        Self {
            wallets: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a wallet with a zero balance. Wallets are created once per
    /// account and never deleted.
    pub fn open_wallet(&self, owner_id: UserId, currency: Currency) -> WalletId {
        self.open_wallet_with_balance(owner_id, currency, Decimal::ZERO)
    }

    /// Create a wallet carrying an opening balance (seeding/migration path).
    pub fn open_wallet_with_balance(
        &self,
        owner_id: UserId,
        currency: Currency,
        balance: Decimal,
    ) -> WalletId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let wallet = Wallet::with_balance(id, owner_id, currency, balance);
        self.wallets.insert(
            id,
            Arc::new(Mutex::new(WalletEntry {
                wallet,
                applied: HashMap::new(),
            })),
        );
        debug!(wallet_id = id, owner_id, "wallet opened");
        id
    }

    /// Snapshot of a wallet's current state.
    pub fn get(&self, wallet_id: WalletId) -> Result<Wallet, LedgerError> {
        let entry = self.entry(wallet_id)?;
        let guard = lock(&entry);
        Ok(guard.wallet.clone())
    }

    pub fn balance(&self, wallet_id: WalletId) -> Result<Decimal, LedgerError> {
        Ok(self.get(wallet_id)?.balance())
    }

    pub fn currency_of(&self, wallet_id: WalletId) -> Result<Currency, LedgerError> {
        Ok(self.get(wallet_id)?.currency().clone())
    }

    /// Sum of all balances held in `currency`. Money moves, it never
    /// appears or disappears: transfer settlements leave this unchanged.
    pub fn total_of(&self, currency: &Currency) -> Decimal {
        let mut total = Decimal::ZERO;
        for entry in self.wallets.iter() {
            let guard = lock(entry.value());
            if guard.wallet.currency() == currency {
                total += guard.wallet.balance();
            }
        }
        total
    }

    /// Debit `amount` from a wallet under `reference`.
    pub fn debit(
        &self,
        wallet_id: WalletId,
        amount: Decimal,
        reference: &str,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.mutate(wallet_id, MutationKind::Debit, amount, reference)
    }

    /// Credit `amount` to a wallet under `reference`.
    pub fn credit(
        &self,
        wallet_id: WalletId,
        amount: Decimal,
        reference: &str,
    ) -> Result<LedgerReceipt, LedgerError> {
        self.mutate(wallet_id, MutationKind::Credit, amount, reference)
    }

    /// Debit one wallet and credit another, both-or-neither.
    ///
    /// Locks are acquired in wallet-id order, so two transfers touching the
    /// same pair in opposite directions cannot deadlock. The debit
    /// precondition is checked before either wallet is mutated.
    pub fn transfer(
        &self,
        debit_wallet_id: WalletId,
        debit_amount: Decimal,
        credit_wallet_id: WalletId,
        credit_amount: Decimal,
        reference: &str,
    ) -> Result<(LedgerReceipt, LedgerReceipt), LedgerError> {
        if debit_amount <= Decimal::ZERO || credit_amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        if debit_wallet_id == credit_wallet_id {
            return Err(LedgerError::SameWallet);
        }

        let debit_entry = self.entry(debit_wallet_id)?;
        let credit_entry = self.entry(credit_wallet_id)?;

        // Lock in wallet-id order
        let (mut debit_guard, mut credit_guard) = if debit_wallet_id < credit_wallet_id {
            let d = lock(&debit_entry);
            let c = lock(&credit_entry);
            (d, c)
        } else {
            let c = lock(&credit_entry);
            let d = lock(&debit_entry);
            (d, c)
        };

        let prior_debit = debit_guard.replay(MutationKind::Debit, debit_amount, reference)?;
        let prior_credit = credit_guard.replay(MutationKind::Credit, credit_amount, reference)?;
        match (prior_debit, prior_credit) {
            (Some(d), Some(c)) => return Ok((d, c)),
            (None, None) => {}
            _ => {
                let err = LedgerError::InvariantViolation(format!(
                    "reference {} applied to only one leg of {} -> {}",
                    reference, debit_wallet_id, credit_wallet_id
                ));
                error!(reference, "{}", err);
                return Err(err);
            }
        }

        let debit_receipt = debit_guard.apply(MutationKind::Debit, debit_amount, reference)?;
        let credit_receipt =
            match credit_guard.apply(MutationKind::Credit, credit_amount, reference) {
                Ok(receipt) => receipt,
                Err(e) => {
                    // Restore the debited leg so neither wallet moved
                    let _ = credit_back(&mut debit_guard, debit_amount, reference);
                    return Err(e);
                }
            };

        Ok((debit_receipt, credit_receipt))
    }

    fn mutate(
        &self,
        wallet_id: WalletId,
        kind: MutationKind,
        amount: Decimal,
        reference: &str,
    ) -> Result<LedgerReceipt, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        let entry = self.entry(wallet_id)?;
        let mut guard = lock(&entry);

        if let Some(prior) = guard.replay(kind, amount, reference)? {
            debug!(
                wallet_id,
                reference,
                "mutation already applied, returning prior receipt"
            );
            return Ok(prior);
        }

        guard.apply(kind, amount, reference)
    }

    fn entry(&self, wallet_id: WalletId) -> Result<Arc<Mutex<WalletEntry>>, LedgerError> {
        self.wallets
            .get(&wallet_id)
            .map(|e| e.value().clone())
            .ok_or(LedgerError::WalletNotFound(wallet_id))
    }
}

impl Default for WalletLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn lock(entry: &Arc<Mutex<WalletEntry>>) -> MutexGuard<'_, WalletEntry> {
    entry.lock().expect("wallet lock poisoned")
}

/// Undo an applied debit after the credit leg failed.
fn credit_back(
    guard: &mut MutexGuard<'_, WalletEntry>,
    amount: Decimal,
    reference: &str,
) -> Result<(), LedgerError> {
    guard.applied.remove(reference);
    match guard.wallet.credit(amount) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!(reference, "failed to restore debited leg: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd() -> Currency {
        Currency::new("USD")
    }

    fn ledger_with_two_wallets() -> (WalletLedger, WalletId, WalletId) {
        let ledger = WalletLedger::new();
        let a = ledger.open_wallet_with_balance(1, usd(), dec!(1000));
        let b = ledger.open_wallet_with_balance(2, usd(), dec!(200));
        (ledger, a, b)
    }

    #[test]
    fn test_open_and_snapshot() {
        let ledger = WalletLedger::new();
        let id = ledger.open_wallet_with_balance(7, usd(), dec!(50));
        let wallet = ledger.get(id).unwrap();
        assert_eq!(wallet.owner_id(), 7);
        assert_eq!(wallet.balance(), dec!(50));
        assert!(ledger.get(id + 100).is_err());
    }

    #[test]
    fn test_credit_and_debit() {
        let (ledger, a, _) = ledger_with_two_wallets();
        let receipt = ledger.credit(a, dec!(100), "ref-1").unwrap();
        assert_eq!(receipt.balance_after, dec!(1100));
        assert!(!receipt.replayed);

        let receipt = ledger.debit(a, dec!(600), "ref-2").unwrap();
        assert_eq!(receipt.balance_after, dec!(500));
    }

    #[test]
    fn test_debit_insufficient_funds() {
        let (ledger, a, _) = ledger_with_two_wallets();
        let err = ledger.debit(a, dec!(1500), "ref-1").unwrap_err();
        assert_eq!(err, LedgerError::InsufficientFunds { wallet_id: a });
        assert_eq!(ledger.balance(a).unwrap(), dec!(1000));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let (ledger, a, _) = ledger_with_two_wallets();
        assert_eq!(
            ledger.credit(a, dec!(0), "ref-1").unwrap_err(),
            LedgerError::InvalidAmount
        );
    }

    #[test]
    fn test_replay_is_noop_with_prior_receipt() {
        let (ledger, a, _) = ledger_with_two_wallets();
        let first = ledger.credit(a, dec!(100), "ref-1").unwrap();
        let second = ledger.credit(a, dec!(100), "ref-1").unwrap();

        assert!(second.replayed);
        assert_eq!(second.balance_after, first.balance_after);
        assert_eq!(ledger.balance(a).unwrap(), dec!(1100));
    }

    #[test]
    fn test_reference_reuse_with_different_payload_is_violation() {
        let (ledger, a, _) = ledger_with_two_wallets();
        ledger.credit(a, dec!(100), "ref-1").unwrap();
        let err = ledger.credit(a, dec!(999), "ref-1").unwrap_err();
        assert!(matches!(err, LedgerError::InvariantViolation(_)));
    }

    #[test]
    fn test_transfer_moves_both_legs() {
        let (ledger, a, b) = ledger_with_two_wallets();
        let (debit, credit) = ledger.transfer(a, dec!(500), b, dec!(500), "tx-1").unwrap();
        assert_eq!(debit.balance_after, dec!(500));
        assert_eq!(credit.balance_after, dec!(700));
        assert_eq!(ledger.total_of(&usd()), dec!(1200));
    }

    #[test]
    fn test_transfer_insufficient_touches_nothing() {
        let (ledger, a, b) = ledger_with_two_wallets();
        let err = ledger
            .transfer(a, dec!(5000), b, dec!(5000), "tx-1")
            .unwrap_err();
        assert_eq!(err, LedgerError::InsufficientFunds { wallet_id: a });
        assert_eq!(ledger.balance(a).unwrap(), dec!(1000));
        assert_eq!(ledger.balance(b).unwrap(), dec!(200));
    }

    #[test]
    fn test_transfer_replay_is_noop() {
        let (ledger, a, b) = ledger_with_two_wallets();
        ledger.transfer(a, dec!(500), b, dec!(500), "tx-1").unwrap();
        let (debit, credit) = ledger.transfer(a, dec!(500), b, dec!(500), "tx-1").unwrap();

        assert!(debit.replayed);
        assert!(credit.replayed);
        assert_eq!(ledger.balance(a).unwrap(), dec!(500));
        assert_eq!(ledger.balance(b).unwrap(), dec!(700));
    }

    #[test]
    fn test_transfer_same_wallet_rejected() {
        let (ledger, a, _) = ledger_with_two_wallets();
        assert_eq!(
            ledger
                .transfer(a, dec!(10), a, dec!(10), "tx-1")
                .unwrap_err(),
            LedgerError::SameWallet
        );
    }

    #[test]
    fn test_opposing_transfers_do_not_deadlock() {
        use std::sync::Arc;
        use std::thread;

        let (ledger, a, b) = ledger_with_two_wallets();
        let ledger = Arc::new(ledger);

        let mut handles = Vec::new();
        for i in 0..8 {
            let ledger = ledger.clone();
            handles.push(thread::spawn(move || {
                let reference = format!("tx-{}", i);
                if i % 2 == 0 {
                    let _ = ledger.transfer(a, dec!(10), b, dec!(10), &reference);
                } else {
                    let _ = ledger.transfer(b, dec!(10), a, dec!(10), &reference);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // Conservation regardless of interleaving
        assert_eq!(ledger.total_of(&usd()), dec!(1200));
    }
}
