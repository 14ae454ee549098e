//! Settlement Error Types

use thiserror::Error;

use super::types::TransactionId;
use crate::fx::FxError;
use crate::ledger::LedgerError;

#[derive(Error, Debug, Clone)]
pub enum SettlementError {
    #[error("Transaction not found: {0}")]
    NotFound(TransactionId),

    /// The record already has a final outcome; no mutation happened.
    /// This is what makes concurrent duplicate admin clicks safe.
    #[error("Transaction already processed")]
    AlreadyProcessed,

    #[error("Duplicate reference: {0}")]
    DuplicateReference(String),

    #[error("Rejection reason is required")]
    ReasonRequired,

    /// Record stayed PENDING; the decision can be retried once a rate is
    /// available again.
    #[error("Exchange rate unavailable: {0}")]
    RateUnavailable(#[from] FxError),

    /// Escalated ledger failure: the record was forced to FAILED and an
    /// operator alert raised.
    #[error("Ledger invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Ledger error: {0}")]
    Ledger(LedgerError),
}

impl SettlementError {
    /// Stable error code for API responses and audit logs
    pub fn code(&self) -> &'static str {
        match self {
            SettlementError::NotFound(_) => "TRANSACTION_NOT_FOUND",
            SettlementError::AlreadyProcessed => "ALREADY_PROCESSED",
            SettlementError::DuplicateReference(_) => "DUPLICATE_REFERENCE",
            SettlementError::ReasonRequired => "REASON_REQUIRED",
            SettlementError::RateUnavailable(_) => "RATE_UNAVAILABLE",
            SettlementError::InvariantViolation(_) => "LEDGER_INVARIANT_VIOLATION",
            SettlementError::Ledger(e) => e.code(),
        }
    }

    /// HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            SettlementError::NotFound(_) => 404,
            SettlementError::AlreadyProcessed => 409,
            SettlementError::DuplicateReference(_) | SettlementError::ReasonRequired => 400,
            SettlementError::RateUnavailable(_) => 503,
            SettlementError::InvariantViolation(_) => 500,
            SettlementError::Ledger(e) => e.http_status(),
        }
    }
}
