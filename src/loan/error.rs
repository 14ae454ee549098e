//! Loan error types

use thiserror::Error;

use super::state::LoanStatus;
use crate::money::MoneyError;
use crate::settlement::SettlementError;

#[derive(Debug, Error)]
pub enum LoanError {
    #[error("Loan not found")]
    NotFound,

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] MoneyError),

    #[error("Reason is required")]
    ReasonRequired,

    #[error("Wallet not found: {0}")]
    WalletNotFound(u64),

    /// Action not legal from the loan's current state
    #[error("Cannot {action} a loan in state {from}")]
    InvalidTransition {
        from: LoanStatus,
        action: &'static str,
    },

    /// The disbursement already happened; nothing was credited again
    #[error("Loan already processed")]
    AlreadyProcessed,

    /// Disbursement settlement failed; the loan stays APPROVED
    #[error("Disbursement failed: {0}")]
    DisbursementFailed(String),

    #[error(transparent)]
    Settlement(#[from] SettlementError),
}

impl LoanError {
    /// Stable error code for API responses and audit logs
    pub fn code(&self) -> &'static str {
        match self {
            LoanError::NotFound => "LOAN_NOT_FOUND",
            LoanError::InvalidAmount(_) => "INVALID_AMOUNT",
            LoanError::ReasonRequired => "REASON_REQUIRED",
            LoanError::WalletNotFound(_) => "WALLET_NOT_FOUND",
            LoanError::InvalidTransition { .. } => "INVALID_TRANSITION",
            LoanError::AlreadyProcessed => "ALREADY_PROCESSED",
            LoanError::DisbursementFailed(_) => "DISBURSEMENT_FAILED",
            LoanError::Settlement(e) => e.code(),
        }
    }

    /// HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            LoanError::NotFound | LoanError::WalletNotFound(_) => 404,
            LoanError::InvalidAmount(_) | LoanError::ReasonRequired => 400,
            LoanError::InvalidTransition { .. } | LoanError::AlreadyProcessed => 409,
            LoanError::DisbursementFailed(_) => 422,
            LoanError::Settlement(e) => e.http_status(),
        }
    }
}
