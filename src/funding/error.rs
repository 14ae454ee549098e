//! Intake error types

use thiserror::Error;

use crate::core_types::WalletId;
use crate::money::MoneyError;
use crate::settlement::SettlementError;

#[derive(Debug, Error)]
pub enum FundingError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] MoneyError),

    #[error("Missing external reference")]
    MissingReference,

    #[error("Wallet not found: {0}")]
    WalletNotFound(WalletId),

    /// Same external reference seen before (replayed submission)
    #[error("Duplicate reference: {0}")]
    DuplicateReference(String),

    #[error(transparent)]
    Settlement(SettlementError),
}

impl FundingError {
    pub fn code(&self) -> &'static str {
        match self {
            FundingError::InvalidAmount(_) => "INVALID_AMOUNT",
            FundingError::MissingReference => "MISSING_REFERENCE",
            FundingError::WalletNotFound(_) => "WALLET_NOT_FOUND",
            FundingError::DuplicateReference(_) => "DUPLICATE_REFERENCE",
            FundingError::Settlement(e) => e.code(),
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            FundingError::InvalidAmount(_) | FundingError::MissingReference => 400,
            FundingError::WalletNotFound(_) => 404,
            FundingError::DuplicateReference(_) => 409,
            FundingError::Settlement(e) => e.http_status(),
        }
    }
}

impl From<SettlementError> for FundingError {
    fn from(e: SettlementError) -> Self {
        match e {
            SettlementError::DuplicateReference(r) => FundingError::DuplicateReference(r),
            other => FundingError::Settlement(other),
        }
    }
}
