//! Pre-authorization error types

use thiserror::Error;

use super::transfer_code::TransferCodeType;
use crate::money::MoneyError;

#[derive(Error, Debug, Clone)]
pub enum PreAuthError {
    // === OTP sub-gate ===
    #[error("Challenge not found")]
    ChallengeNotFound,

    #[error("Challenge expired")]
    OtpExpired,

    #[error("Challenge already consumed")]
    OtpAlreadyConsumed,

    #[error("Wrong code, {attempts_remaining} attempts remaining")]
    OtpMismatch { attempts_remaining: u32 },

    #[error("Challenge attempts exhausted")]
    OtpAttemptsExceeded,

    // === Transfer-code sub-gate ===
    #[error("Transfer code {0} has not been issued")]
    CodeNotIssued(TransferCodeType),

    #[error("Transfer code {0} is not active")]
    CodeInactive(TransferCodeType),

    #[error("Transfer code {0} does not match")]
    CodeMismatch(TransferCodeType),

    /// Listed types must be verified before the transfer is admitted
    #[error("Transfer codes outstanding: {0:?}")]
    TransferCodeRequired(Vec<TransferCodeType>),

    // === Request validation ===
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] MoneyError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Wallet not found: {0}")]
    WalletNotFound(u64),

    #[error("Duplicate reference: {0}")]
    DuplicateReference(String),

    // === System ===
    #[error("Code hashing failed: {0}")]
    HashFailure(String),
}

impl PreAuthError {
    /// Stable error code for API responses and audit logs
    pub fn code(&self) -> &'static str {
        match self {
            PreAuthError::ChallengeNotFound => "CHALLENGE_NOT_FOUND",
            PreAuthError::OtpExpired => "OTP_EXPIRED",
            PreAuthError::OtpAlreadyConsumed => "OTP_ALREADY_CONSUMED",
            PreAuthError::OtpMismatch { .. } => "OTP_MISMATCH",
            PreAuthError::OtpAttemptsExceeded => "OTP_ATTEMPTS_EXCEEDED",
            PreAuthError::CodeNotIssued(_) => "TRANSFER_CODE_NOT_ISSUED",
            PreAuthError::CodeInactive(_) => "TRANSFER_CODE_INACTIVE",
            PreAuthError::CodeMismatch(_) => "TRANSFER_CODE_MISMATCH",
            PreAuthError::TransferCodeRequired(_) => "TRANSFER_CODE_REQUIRED",
            PreAuthError::InvalidAmount(_) => "INVALID_AMOUNT",
            PreAuthError::InvalidRequest(_) => "INVALID_REQUEST",
            PreAuthError::WalletNotFound(_) => "WALLET_NOT_FOUND",
            PreAuthError::DuplicateReference(_) => "DUPLICATE_REFERENCE",
            PreAuthError::HashFailure(_) => "HASH_FAILURE",
        }
    }

    /// HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            PreAuthError::ChallengeNotFound | PreAuthError::WalletNotFound(_) => 404,
            PreAuthError::OtpExpired
            | PreAuthError::OtpAlreadyConsumed
            | PreAuthError::OtpMismatch { .. }
            | PreAuthError::OtpAttemptsExceeded
            | PreAuthError::CodeNotIssued(_)
            | PreAuthError::CodeInactive(_)
            | PreAuthError::CodeMismatch(_)
            | PreAuthError::TransferCodeRequired(_) => 403,
            PreAuthError::InvalidAmount(_) | PreAuthError::InvalidRequest(_) => 400,
            PreAuthError::DuplicateReference(_) => 409,
            PreAuthError::HashFailure(_) => 500,
        }
    }
}
