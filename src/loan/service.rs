//! Loan service
//!
//! Owns every LoanApplication and drives the LoanFeeGate transitions.
//! Each application is a serialization unit: whichever transition takes
//! the lock first wins, and the loser sees the post-transition state.
//! `disburse` is the only transition that touches the ledger, and it does
//! so through the generic settlement path.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::info;

use super::error::LoanError;
use super::state::LoanStatus;
use super::types::{LoanApplication, LoanId};
use crate::core_types::{AdminId, UserId, WalletId};
use crate::money;
use crate::notify::NotificationSink;
use crate::settlement::{SettlementError, SettlementService, TransactionRecord, TxStatus};

pub struct LoanService {
    loans: DashMap<LoanId, Arc<Mutex<LoanApplication>>>,
    settlement: Arc<SettlementService>,
    sink: Arc<dyn NotificationSink>,
}

impl LoanService {
    pub fn new(settlement: Arc<SettlementService>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            loans: DashMap::new(),
            settlement,
            sink,
        }
    }

    /// User requests a loan; the borrower wallet fixes the disbursement
    /// target and currency.
    pub fn apply(
        &self,
        user_id: UserId,
        wallet_id: WalletId,
        amount: Decimal,
    ) -> Result<LoanId, LoanError> {
        money::require_positive(amount)?;
        let wallet = self
            .settlement
            .ledger()
            .get(wallet_id)
            .map_err(|_| LoanError::WalletNotFound(wallet_id))?;

        let loan = LoanApplication::new(user_id, wallet_id, amount, wallet.currency().clone());
        let id = loan.id;
        self.loans.insert(id, Arc::new(Mutex::new(loan)));
        info!(loan_id = %id, user_id, wallet_id, "loan application created");
        Ok(id)
    }

    /// Admin inserts the optional processing-fee step.
    pub fn request_fee(
        &self,
        loan_id: LoanId,
        fee: Decimal,
        fee_wallet_address: &str,
        note: Option<String>,
    ) -> Result<LoanStatus, LoanError> {
        money::require_positive(fee)?;
        let loan = self.entry(loan_id)?;
        let mut guard = lock(&loan);
        require_state(&guard, LoanStatus::Pending, "request a fee for")?;

        guard.processing_fee = Some(fee);
        guard.fee_wallet_address = Some(fee_wallet_address.to_string());
        if note.is_some() {
            guard.approval_note = note;
        }
        self.transition(guard, LoanStatus::FeePending)
    }

    /// User submits proof of the fee payment.
    pub fn submit_fee_proof(
        &self,
        loan_id: LoanId,
        user_id: UserId,
        proof_ref: &str,
    ) -> Result<LoanStatus, LoanError> {
        if proof_ref.trim().is_empty() {
            return Err(LoanError::ReasonRequired);
        }
        let loan = self.entry(loan_id)?;
        let mut guard = lock(&loan);
        if guard.user_id != user_id {
            return Err(LoanError::NotFound);
        }
        require_state(&guard, LoanStatus::FeePending, "submit fee proof for")?;

        guard.fee_payment_proof = Some(proof_ref.to_string());
        self.transition(guard, LoanStatus::FeePaid)
    }

    /// Admin confirms the fee arrived. No ledger effect here.
    pub fn verify_fee(&self, loan_id: LoanId) -> Result<LoanStatus, LoanError> {
        let loan = self.entry(loan_id)?;
        let mut guard = lock(&loan);
        require_state(&guard, LoanStatus::FeePaid, "verify the fee of")?;

        guard.reviewed_at = Some(Utc::now().timestamp_millis());
        self.transition(guard, LoanStatus::Approved)
    }

    /// Admin approves directly, skipping the fee step.
    pub fn approve(&self, loan_id: LoanId, note: Option<String>) -> Result<LoanStatus, LoanError> {
        let loan = self.entry(loan_id)?;
        let mut guard = lock(&loan);
        require_state(&guard, LoanStatus::Pending, "approve")?;

        guard.approval_note = note;
        guard.reviewed_at = Some(Utc::now().timestamp_millis());
        self.transition(guard, LoanStatus::Approved)
    }

    /// Admin turns the application down. Allowed from any pre-approval
    /// state; the ledger is untouched.
    pub fn reject(&self, loan_id: LoanId, reason: &str) -> Result<LoanStatus, LoanError> {
        if reason.trim().is_empty() {
            return Err(LoanError::ReasonRequired);
        }
        let loan = self.entry(loan_id)?;
        let mut guard = lock(&loan);
        if !guard.status.is_rejectable() {
            return Err(LoanError::InvalidTransition {
                from: guard.status,
                action: "reject",
            });
        }

        guard.rejection_reason = Some(reason.to_string());
        guard.reviewed_at = Some(Utc::now().timestamp_millis());
        self.transition(guard, LoanStatus::Rejected)
    }

    /// Admin amends the requested amount without changing status.
    /// Re-proposal is idempotent per call; the loan stays PENDING.
    pub fn propose(
        &self,
        loan_id: LoanId,
        new_amount: Decimal,
        note: Option<String>,
    ) -> Result<LoanStatus, LoanError> {
        money::require_positive(new_amount)?;
        let loan = self.entry(loan_id)?;
        let mut guard = lock(&loan);
        require_state(&guard, LoanStatus::Pending, "re-propose")?;

        guard.amount = new_amount;
        if note.is_some() {
            guard.approval_note = note;
        }
        guard.updated_at = Utc::now().timestamp_millis();
        info!(loan_id = %loan_id, amount = %new_amount, "loan amount re-proposed");
        Ok(LoanStatus::Pending)
    }

    /// The only transition with a ledger effect: credit the borrower's
    /// wallet through the settlement path and move the loan to ACTIVE.
    ///
    /// The disbursement record's reference is the loan id, so at most one
    /// disbursement record can ever exist per loan; a second call finds
    /// the loan ACTIVE and returns `AlreadyProcessed` with no credit.
    pub fn disburse(&self, loan_id: LoanId, decided_by: AdminId) -> Result<LoanStatus, LoanError> {
        let loan = self.entry(loan_id)?;
        let mut guard = lock(&loan);

        match guard.status {
            LoanStatus::Active => return Err(LoanError::AlreadyProcessed),
            LoanStatus::Approved => {}
            other => {
                return Err(LoanError::InvalidTransition {
                    from: other,
                    action: "disburse",
                });
            }
        }

        let reference = guard.id.to_string();
        let store = self.settlement.store();
        let tx_id = match store.insert(TransactionRecord::loan_disbursement(
            guard.wallet_id,
            guard.amount,
            guard.currency.clone(),
            reference.clone(),
        )) {
            Ok(id) => id,
            // A prior attempt already created the record (e.g. settle
            // raced an error); resume with that one.
            Err(SettlementError::DuplicateReference(_)) => store
                .get_by_reference(&reference)
                .map(|record| record.lock().expect("transaction lock poisoned").id)
                .ok_or(LoanError::NotFound)?,
            Err(e) => return Err(e.into()),
        };

        match self.settlement.settle(tx_id, decided_by) {
            Ok(TxStatus::Completed) => {
                guard.reviewed_at = Some(Utc::now().timestamp_millis());
                self.transition(guard, LoanStatus::Active)
            }
            Ok(_) => {
                // Ledger rejected the credit; the loan stays APPROVED
                let reason = store
                    .snapshot(tx_id)
                    .and_then(|r| r.reason)
                    .unwrap_or_else(|| "ledger rejected".to_string());
                Err(LoanError::DisbursementFailed(reason))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// External repayment tracking reports the loan repaid in full.
    pub fn mark_completed(&self, loan_id: LoanId) -> Result<LoanStatus, LoanError> {
        let loan = self.entry(loan_id)?;
        let guard = lock(&loan);
        require_state(&guard, LoanStatus::Active, "complete")?;
        self.transition(guard, LoanStatus::Completed)
    }

    /// External repayment tracking writes the loan off.
    pub fn mark_defaulted(&self, loan_id: LoanId) -> Result<LoanStatus, LoanError> {
        let loan = self.entry(loan_id)?;
        let guard = lock(&loan);
        require_state(&guard, LoanStatus::Active, "default")?;
        self.transition(guard, LoanStatus::Defaulted)
    }

    /// Point-in-time copy for queries.
    pub fn snapshot(&self, loan_id: LoanId) -> Option<LoanApplication> {
        let loan = self.loans.get(&loan_id)?.value().clone();
        let guard = lock(&loan);
        Some(guard.clone())
    }

    fn entry(&self, loan_id: LoanId) -> Result<Arc<Mutex<LoanApplication>>, LoanError> {
        self.loans
            .get(&loan_id)
            .map(|e| e.value().clone())
            .ok_or(LoanError::NotFound)
    }

    /// Flip the status, stamp updated_at, release the lock, then emit.
    fn transition(
        &self,
        mut guard: MutexGuard<'_, LoanApplication>,
        new: LoanStatus,
    ) -> Result<LoanStatus, LoanError> {
        let old = guard.status;
        guard.status = new;
        guard.updated_at = Utc::now().timestamp_millis();
        let entity_id = guard.id.to_string();
        info!(loan_id = %entity_id, from = %old, to = %new, "loan transition");
        drop(guard);
        self.sink
            .on_status_change(&entity_id, old.as_str(), new.as_str());
        Ok(new)
    }
}

fn lock(loan: &Arc<Mutex<LoanApplication>>) -> MutexGuard<'_, LoanApplication> {
    loan.lock().expect("loan lock poisoned")
}

fn require_state(
    loan: &LoanApplication,
    expected: LoanStatus,
    action: &'static str,
) -> Result<(), LoanError> {
    if loan.status != expected {
        return Err(LoanError::InvalidTransition {
            from: loan.status,
            action,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::FixedRateSource;
    use crate::ledger::WalletLedger;
    use crate::money::Currency;
    use crate::notify::NoopSink;
    use crate::settlement::TransactionStore;
    use rust_decimal_macros::dec;

    struct Fixture {
        service: LoanService,
        ledger: Arc<WalletLedger>,
        wallet: WalletId,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(TransactionStore::new());
        let ledger = Arc::new(WalletLedger::new());
        let sink: Arc<NoopSink> = Arc::new(NoopSink);
        let settlement = Arc::new(SettlementService::new(
            store,
            ledger.clone(),
            Arc::new(FixedRateSource::new()),
            sink.clone(),
        ));
        let wallet = ledger.open_wallet(7, Currency::new("USD"));
        Fixture {
            service: LoanService::new(settlement, sink),
            ledger,
            wallet,
        }
    }

    #[test]
    fn test_fee_gate_path_to_active() {
        let f = fixture();
        let id = f.service.apply(7, f.wallet, dec!(50000)).unwrap();

        assert_eq!(
            f.service
                .request_fee(id, dec!(20), "fee-wallet-x", None)
                .unwrap(),
            LoanStatus::FeePending
        );
        assert_eq!(
            f.service.submit_fee_proof(id, 7, "proof-123").unwrap(),
            LoanStatus::FeePaid
        );
        // Fee verification never touches the ledger
        assert_eq!(f.ledger.balance(f.wallet).unwrap(), Decimal::ZERO);
        assert_eq!(f.service.verify_fee(id).unwrap(), LoanStatus::Approved);

        assert_eq!(f.service.disburse(id, 1).unwrap(), LoanStatus::Active);
        assert_eq!(f.ledger.balance(f.wallet).unwrap(), dec!(50000));
    }

    #[test]
    fn test_disburse_twice_credits_once() {
        let f = fixture();
        let id = f.service.apply(7, f.wallet, dec!(50000)).unwrap();
        f.service.approve(id, None).unwrap();
        f.service.disburse(id, 1).unwrap();

        assert!(matches!(
            f.service.disburse(id, 1),
            Err(LoanError::AlreadyProcessed)
        ));
        assert_eq!(f.ledger.balance(f.wallet).unwrap(), dec!(50000));
    }

    #[test]
    fn test_direct_approve_skips_fee_step() {
        let f = fixture();
        let id = f.service.apply(7, f.wallet, dec!(1000)).unwrap();
        assert_eq!(
            f.service.approve(id, Some("fast track".into())).unwrap(),
            LoanStatus::Approved
        );
        let loan = f.service.snapshot(id).unwrap();
        assert_eq!(loan.approval_note.as_deref(), Some("fast track"));
        assert!(loan.processing_fee.is_none());
    }

    #[test]
    fn test_reject_from_fee_states() {
        let f = fixture();
        let id = f.service.apply(7, f.wallet, dec!(1000)).unwrap();
        f.service.request_fee(id, dec!(20), "addr", None).unwrap();
        f.service.submit_fee_proof(id, 7, "proof").unwrap();

        assert_eq!(
            f.service.reject(id, "document mismatch").unwrap(),
            LoanStatus::Rejected
        );
        // Terminal: nothing moves it back
        assert!(matches!(
            f.service.approve(id, None),
            Err(LoanError::InvalidTransition { .. })
        ));
        assert!(matches!(
            f.service.reject(id, "again"),
            Err(LoanError::InvalidTransition { .. })
        ));
        assert_eq!(f.ledger.balance(f.wallet).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_reject_requires_reason() {
        let f = fixture();
        let id = f.service.apply(7, f.wallet, dec!(1000)).unwrap();
        assert!(matches!(
            f.service.reject(id, " "),
            Err(LoanError::ReasonRequired)
        ));
    }

    #[test]
    fn test_propose_amends_amount_keeps_pending() {
        let f = fixture();
        let id = f.service.apply(7, f.wallet, dec!(50000)).unwrap();

        assert_eq!(
            f.service
                .propose(id, dec!(30000), Some("reduced exposure".into()))
                .unwrap(),
            LoanStatus::Pending
        );
        assert_eq!(
            f.service.propose(id, dec!(30000), None).unwrap(),
            LoanStatus::Pending
        );
        let loan = f.service.snapshot(id).unwrap();
        assert_eq!(loan.amount, dec!(30000));
        assert_eq!(loan.status, LoanStatus::Pending);
    }

    #[test]
    fn test_propose_loses_race_to_approve() {
        let f = fixture();
        let id = f.service.apply(7, f.wallet, dec!(50000)).unwrap();
        f.service.approve(id, None).unwrap();

        // Whoever acquires the lock second sees the post-transition state
        assert!(matches!(
            f.service.propose(id, dec!(30000), None),
            Err(LoanError::InvalidTransition {
                from: LoanStatus::Approved,
                ..
            })
        ));
    }

    #[test]
    fn test_fee_proof_owner_check() {
        let f = fixture();
        let id = f.service.apply(7, f.wallet, dec!(1000)).unwrap();
        f.service.request_fee(id, dec!(20), "addr", None).unwrap();
        assert!(matches!(
            f.service.submit_fee_proof(id, 8, "proof"),
            Err(LoanError::NotFound)
        ));
    }

    #[test]
    fn test_repayment_bookkeeping() {
        let f = fixture();
        let id = f.service.apply(7, f.wallet, dec!(1000)).unwrap();
        f.service.approve(id, None).unwrap();
        f.service.disburse(id, 1).unwrap();

        assert_eq!(
            f.service.mark_completed(id).unwrap(),
            LoanStatus::Completed
        );
        assert!(matches!(
            f.service.mark_defaulted(id),
            Err(LoanError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_disburse_before_approval_rejected() {
        let f = fixture();
        let id = f.service.apply(7, f.wallet, dec!(1000)).unwrap();
        assert!(matches!(
            f.service.disburse(id, 1),
            Err(LoanError::InvalidTransition {
                from: LoanStatus::Pending,
                ..
            })
        ));
    }
}
