//! Ledger error types

use thiserror::Error;

use crate::core_types::WalletId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Wallet not found: {0}")]
    WalletNotFound(WalletId),

    #[error("Insufficient funds in wallet {wallet_id}")]
    InsufficientFunds { wallet_id: WalletId },

    #[error("Source and target wallet cannot be the same")]
    SameWallet,

    #[error("Balance arithmetic overflow in wallet {wallet_id}")]
    Overflow { wallet_id: WalletId },

    /// A correctness-engine bug, not a user error. Never silently retried;
    /// callers escalate for manual reconciliation.
    #[error("Ledger invariant violation: {0}")]
    InvariantViolation(String),
}

impl LedgerError {
    /// Stable error code for API responses and audit logs
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidAmount => "INVALID_AMOUNT",
            LedgerError::WalletNotFound(_) => "WALLET_NOT_FOUND",
            LedgerError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            LedgerError::SameWallet => "SAME_WALLET",
            LedgerError::Overflow { .. } => "OVERFLOW",
            LedgerError::InvariantViolation(_) => "LEDGER_INVARIANT_VIOLATION",
        }
    }

    /// HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            LedgerError::InvalidAmount | LedgerError::SameWallet => 400,
            LedgerError::WalletNotFound(_) => 404,
            LedgerError::InsufficientFunds { .. } => 422,
            LedgerError::Overflow { .. } | LedgerError::InvariantViolation(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::InsufficientFunds { wallet_id: 1 }.code(),
            "INSUFFICIENT_FUNDS"
        );
        assert_eq!(LedgerError::WalletNotFound(9).code(), "WALLET_NOT_FOUND");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(LedgerError::InvalidAmount.http_status(), 400);
        assert_eq!(
            LedgerError::InsufficientFunds { wallet_id: 1 }.http_status(),
            422
        );
        assert_eq!(
            LedgerError::InvariantViolation("x".into()).http_status(),
            500
        );
    }
}
