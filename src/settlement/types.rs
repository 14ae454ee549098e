//! Settlement Core Types

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;

use super::state::TxStatus;
use crate::core_types::{AdminId, WalletId};
use crate::money::Currency;

/// Transaction ID - ULID-based unique identifier
///
/// Monotonic, sortable, no coordination needed. The string form doubles as
/// the ledger reference for the record's settlement, which is how replays
/// are detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(ulid::Ulid);

impl TransactionId {
    /// Generate a new unique TransactionId
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransactionId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

/// Funds-movement kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum TxKind {
    /// External funds in; no sender wallet
    Deposit = 1,
    /// External funds out; no receiver wallet
    Withdrawal = 2,
    /// Wallet-to-wallet movement
    Transfer = 3,
    /// Loan principal credit to the borrower wallet
    LoanDisbursement = 4,
}

impl TxKind {
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(TxKind::Deposit),
            2 => Some(TxKind::Withdrawal),
            3 => Some(TxKind::Transfer),
            4 => Some(TxKind::LoanDisbursement),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Deposit => "DEPOSIT",
            TxKind::Withdrawal => "WITHDRAWAL",
            TxKind::Transfer => "TRANSFER",
            TxKind::LoanDisbursement => "LOAN_DISBURSEMENT",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One funds-movement intent and its audit trail.
///
/// Created PENDING by intake (deposits/withdrawals), the pre-authorization
/// gate (transfers), or loan disbursement; decided exactly once by the
/// settlement service; terminal afterwards.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub kind: TxKind,
    pub status: TxStatus,
    pub amount: Decimal,
    pub currency: Currency,
    /// None for deposits (funds arrive from outside)
    pub sender_wallet_id: Option<WalletId>,
    /// None for withdrawals (funds leave the system)
    pub receiver_wallet_id: Option<WalletId>,
    /// Globally unique idempotency key for the submission
    pub reference: String,
    /// Set only on FAILED
    pub reason: Option<String>,
    pub created_at: i64,
    pub decided_at: Option<i64>,
    pub decided_by: Option<AdminId>,
}

impl TransactionRecord {
    pub fn deposit(
        receiver_wallet_id: WalletId,
        amount: Decimal,
        currency: Currency,
        reference: String,
    ) -> Self {
        Self::new(
            TxKind::Deposit,
            None,
            Some(receiver_wallet_id),
            amount,
            currency,
            reference,
        )
    }

    pub fn withdrawal(
        sender_wallet_id: WalletId,
        amount: Decimal,
        currency: Currency,
        reference: String,
    ) -> Self {
        Self::new(
            TxKind::Withdrawal,
            Some(sender_wallet_id),
            None,
            amount,
            currency,
            reference,
        )
    }

    pub fn transfer(
        sender_wallet_id: WalletId,
        receiver_wallet_id: WalletId,
        amount: Decimal,
        currency: Currency,
        reference: String,
    ) -> Self {
        Self::new(
            TxKind::Transfer,
            Some(sender_wallet_id),
            Some(receiver_wallet_id),
            amount,
            currency,
            reference,
        )
    }

    pub fn loan_disbursement(
        receiver_wallet_id: WalletId,
        amount: Decimal,
        currency: Currency,
        reference: String,
    ) -> Self {
        Self::new(
            TxKind::LoanDisbursement,
            None,
            Some(receiver_wallet_id),
            amount,
            currency,
            reference,
        )
    }

    fn new(
        kind: TxKind,
        sender_wallet_id: Option<WalletId>,
        receiver_wallet_id: Option<WalletId>,
        amount: Decimal,
        currency: Currency,
        reference: String,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            kind,
            status: TxStatus::Pending,
            amount,
            currency,
            sender_wallet_id,
            receiver_wallet_id,
            reference,
            reason: None,
            created_at: Utc::now().timestamp_millis(),
            decided_at: None,
            decided_by: None,
        }
    }
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tx[{}] {} {} {} sender={:?} receiver={:?} status={}",
            self.id,
            self.kind,
            self.amount,
            self.currency,
            self.sender_wallet_id,
            self.receiver_wallet_id,
            self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            TxKind::Deposit,
            TxKind::Withdrawal,
            TxKind::Transfer,
            TxKind::LoanDisbursement,
        ] {
            assert_eq!(TxKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(TxKind::from_id(0), None);
    }

    #[test]
    fn test_transaction_id_roundtrip() {
        let id = TransactionId::new();
        let parsed: TransactionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_constructors_shape_wallet_sides() {
        let deposit =
            TransactionRecord::deposit(5, dec!(100), Currency::new("USD"), "d-1".into());
        assert_eq!(deposit.kind, TxKind::Deposit);
        assert_eq!(deposit.sender_wallet_id, None);
        assert_eq!(deposit.receiver_wallet_id, Some(5));
        assert_eq!(deposit.status, TxStatus::Pending);
        assert!(deposit.decided_at.is_none());

        let withdrawal =
            TransactionRecord::withdrawal(5, dec!(100), Currency::new("USD"), "w-1".into());
        assert_eq!(withdrawal.sender_wallet_id, Some(5));
        assert_eq!(withdrawal.receiver_wallet_id, None);

        let transfer =
            TransactionRecord::transfer(1, 2, dec!(100), Currency::new("USD"), "t-1".into());
        assert_eq!(transfer.sender_wallet_id, Some(1));
        assert_eq!(transfer.receiver_wallet_id, Some(2));
    }
}
