//! Settlement Service
//!
//! Drives the PENDING -> {COMPLETED, FAILED} transition. The decision and
//! the ledger mutations happen under the record's lock as one unit of
//! work: either the status flips to COMPLETED and the balances moved, or
//! the record is FAILED and no balance changed.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use super::error::SettlementError;
use super::state::TxStatus;
use super::store::TransactionStore;
use super::types::{TransactionId, TransactionRecord, TxKind};
use crate::core_types::{AdminId, WalletId};
use crate::fx::{FxError, RateSource};
use crate::ledger::{LedgerError, WalletLedger};
use crate::money;
use crate::notify::NotificationSink;

/// Why the ledger part of a settlement did not complete.
enum LegFailure {
    /// Collaborator unavailable; the record stays PENDING and the decision
    /// can be retried.
    Rate(FxError),
    /// The ledger rejected the mutation; the record fails with
    /// `LedgerRejected`.
    Rejected(LedgerError),
    /// Correctness-engine bug; escalated.
    Invariant(String),
}

pub struct SettlementService {
    store: Arc<TransactionStore>,
    ledger: Arc<WalletLedger>,
    rates: Arc<dyn RateSource>,
    sink: Arc<dyn NotificationSink>,
}

impl SettlementService {
    pub fn new(
        store: Arc<TransactionStore>,
        ledger: Arc<WalletLedger>,
        rates: Arc<dyn RateSource>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            store,
            ledger,
            rates,
            sink,
        }
    }

    pub fn store(&self) -> &Arc<TransactionStore> {
        &self.store
    }

    pub fn ledger(&self) -> &Arc<WalletLedger> {
        &self.ledger
    }

    /// Settle a PENDING record: apply the required ledger mutations and
    /// transition to COMPLETED, or to FAILED with reason `LedgerRejected`
    /// if the ledger refuses (e.g. funds raced away since intake).
    ///
    /// Any non-PENDING record returns `AlreadyProcessed` untouched.
    pub fn settle(
        &self,
        tx_id: TransactionId,
        decided_by: AdminId,
    ) -> Result<TxStatus, SettlementError> {
        let record = self
            .store
            .get(tx_id)
            .ok_or(SettlementError::NotFound(tx_id))?;
        let mut guard = record.lock().expect("transaction lock poisoned");

        if guard.status.is_terminal() {
            // Audit trail for duplicate admin clicks; not a system failure
            debug!(tx_id = %tx_id, status = %guard.status, "settle ignored, already decided");
            return Err(SettlementError::AlreadyProcessed);
        }

        match self.apply_ledger(&guard) {
            Ok(()) => {
                let old = guard.status;
                guard.status = TxStatus::Completed;
                Self::stamp_decision(&mut guard, decided_by);
                info!(tx_id = %tx_id, decided_by, "transaction settled");
                self.emit(guard, old, TxStatus::Completed);
                Ok(TxStatus::Completed)
            }
            Err(LegFailure::Rate(e)) => {
                // Nothing moved and nothing was decided; retryable.
                warn!(tx_id = %tx_id, "settlement deferred: {}", e);
                Err(SettlementError::RateUnavailable(e))
            }
            Err(LegFailure::Rejected(e)) => {
                let old = guard.status;
                guard.status = TxStatus::Failed;
                guard.reason = Some(format!("LedgerRejected: {}", e));
                Self::stamp_decision(&mut guard, decided_by);
                info!(tx_id = %tx_id, decided_by, "settlement rejected by ledger: {}", e);
                self.emit(guard, old, TxStatus::Failed);
                Ok(TxStatus::Failed)
            }
            Err(LegFailure::Invariant(msg)) => {
                // Forced failure + operator alert; never silently retried.
                let old = guard.status;
                guard.status = TxStatus::Failed;
                guard.reason = Some(format!("LedgerInvariantViolation: {}", msg));
                Self::stamp_decision(&mut guard, decided_by);
                error!(
                    tx_id = %tx_id,
                    "LEDGER INVARIANT VIOLATION, manual reconciliation required: {}",
                    msg
                );
                self.emit(guard, old, TxStatus::Failed);
                Err(SettlementError::InvariantViolation(msg))
            }
        }
    }

    /// Fail a PENDING record with a mandatory reason; no ledger effect.
    pub fn fail(
        &self,
        tx_id: TransactionId,
        decided_by: AdminId,
        reason: &str,
    ) -> Result<TxStatus, SettlementError> {
        if reason.trim().is_empty() {
            return Err(SettlementError::ReasonRequired);
        }

        let record = self
            .store
            .get(tx_id)
            .ok_or(SettlementError::NotFound(tx_id))?;
        let mut guard = record.lock().expect("transaction lock poisoned");

        if guard.status.is_terminal() {
            debug!(tx_id = %tx_id, status = %guard.status, "fail ignored, already decided");
            return Err(SettlementError::AlreadyProcessed);
        }

        let old = guard.status;
        guard.status = TxStatus::Failed;
        guard.reason = Some(reason.to_string());
        Self::stamp_decision(&mut guard, decided_by);
        info!(tx_id = %tx_id, decided_by, reason, "transaction failed");
        self.emit(guard, old, TxStatus::Failed);
        Ok(TxStatus::Failed)
    }

    fn stamp_decision(record: &mut TransactionRecord, decided_by: AdminId) {
        record.decided_by = Some(decided_by);
        record.decided_at = Some(chrono::Utc::now().timestamp_millis());
    }

    /// Apply the ledger mutations for a record, using the record id as the
    /// ledger reference so a replay after a crash is a no-op.
    fn apply_ledger(&self, record: &TransactionRecord) -> Result<(), LegFailure> {
        let reference = record.id.to_string();
        match record.kind {
            TxKind::Deposit | TxKind::LoanDisbursement => {
                let wallet_id = record
                    .receiver_wallet_id
                    .ok_or_else(|| LegFailure::Invariant("credit leg without wallet".into()))?;
                let amount = self.leg_amount(record, wallet_id)?;
                self.ledger
                    .credit(wallet_id, amount, &reference)
                    .map(|_| ())
                    .map_err(classify)
            }
            TxKind::Withdrawal => {
                let wallet_id = record
                    .sender_wallet_id
                    .ok_or_else(|| LegFailure::Invariant("debit leg without wallet".into()))?;
                let amount = self.leg_amount(record, wallet_id)?;
                self.ledger
                    .debit(wallet_id, amount, &reference)
                    .map(|_| ())
                    .map_err(classify)
            }
            TxKind::Transfer => {
                let sender = record
                    .sender_wallet_id
                    .ok_or_else(|| LegFailure::Invariant("transfer without sender".into()))?;
                let receiver = record
                    .receiver_wallet_id
                    .ok_or_else(|| LegFailure::Invariant("transfer without receiver".into()))?;
                let debit_amount = self.leg_amount(record, sender)?;
                let credit_amount = self.leg_amount(record, receiver)?;
                self.ledger
                    .transfer(sender, debit_amount, receiver, credit_amount, &reference)
                    .map(|_| ())
                    .map_err(classify)
            }
        }
    }

    /// Amount of one leg in the wallet's own currency. The rate is an
    /// opaque external input; a stale cached value is acceptable.
    fn leg_amount(
        &self,
        record: &TransactionRecord,
        wallet_id: WalletId,
    ) -> Result<Decimal, LegFailure> {
        let wallet_currency = self.ledger.currency_of(wallet_id).map_err(classify)?;
        if wallet_currency == record.currency {
            return Ok(record.amount);
        }
        let rate = self
            .rates
            .rate(&record.currency, &wallet_currency)
            .map_err(LegFailure::Rate)?;
        Ok((record.amount * rate).round_dp(money::MAX_SCALE))
    }

    fn emit(
        &self,
        guard: std::sync::MutexGuard<'_, TransactionRecord>,
        old: TxStatus,
        new: TxStatus,
    ) {
        let entity_id = guard.id.to_string();
        drop(guard);
        self.sink
            .on_status_change(&entity_id, old.as_str(), new.as_str());
    }
}

fn classify(e: LedgerError) -> LegFailure {
    match e {
        LedgerError::InvariantViolation(msg) => LegFailure::Invariant(msg),
        other => LegFailure::Rejected(other),
    }
}
