//! Funding intake service
//!
//! The `reference` is the caller's idempotency key (for deposits typically
//! the external transaction hash); a replayed submission is rejected
//! before any record is created.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use super::error::FundingError;
use crate::core_types::WalletId;
use crate::ledger::WalletLedger;
use crate::money::{self, Currency};
use crate::settlement::{TransactionId, TransactionRecord, TransactionStore};

pub struct FundingService {
    store: Arc<TransactionStore>,
    ledger: Arc<WalletLedger>,
}

impl FundingService {
    pub fn new(store: Arc<TransactionStore>, ledger: Arc<WalletLedger>) -> Self {
        Self { store, ledger }
    }

    /// Queue an inbound deposit as a PENDING record.
    pub fn submit_deposit(
        &self,
        wallet_id: WalletId,
        amount: Decimal,
        currency: Currency,
        reference: &str,
    ) -> Result<TransactionId, FundingError> {
        self.validate(wallet_id, amount, reference)?;
        let id = self.store.insert(TransactionRecord::deposit(
            wallet_id,
            amount,
            currency,
            reference.to_string(),
        ))?;
        info!(tx_id = %id, wallet_id, reference, "deposit queued");
        Ok(id)
    }

    /// Queue an outbound withdrawal as a PENDING record.
    ///
    /// Funds are checked at settlement time, not here: the balance can race
    /// away between intake and approval and the settlement handles that by
    /// failing the record.
    pub fn submit_withdrawal(
        &self,
        wallet_id: WalletId,
        amount: Decimal,
        currency: Currency,
        reference: &str,
    ) -> Result<TransactionId, FundingError> {
        self.validate(wallet_id, amount, reference)?;
        let id = self.store.insert(TransactionRecord::withdrawal(
            wallet_id,
            amount,
            currency,
            reference.to_string(),
        ))?;
        info!(tx_id = %id, wallet_id, reference, "withdrawal queued");
        Ok(id)
    }

    fn validate(
        &self,
        wallet_id: WalletId,
        amount: Decimal,
        reference: &str,
    ) -> Result<(), FundingError> {
        money::require_positive(amount)?;
        if reference.trim().is_empty() {
            return Err(FundingError::MissingReference);
        }
        self.ledger
            .get(wallet_id)
            .map_err(|_| FundingError::WalletNotFound(wallet_id))?;
        Ok(())
    }
}
