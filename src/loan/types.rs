//! Loan Core Types

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;

use super::state::LoanStatus;
use crate::core_types::{UserId, WalletId};
use crate::money::Currency;

/// Loan ID - ULID-based unique identifier
///
/// The string form is the ledger reference for the disbursement credit,
/// which is what makes `disburse` idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoanId(ulid::Ulid);

impl LoanId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for LoanId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LoanId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

/// One loan application and its audit trail.
#[derive(Debug, Clone)]
pub struct LoanApplication {
    pub id: LoanId,
    pub user_id: UserId,
    /// Disbursement target
    pub wallet_id: WalletId,
    pub amount: Decimal,
    pub currency: Currency,
    pub status: LoanStatus,
    pub processing_fee: Option<Decimal>,
    pub fee_wallet_address: Option<String>,
    pub fee_payment_proof: Option<String>,
    pub approval_note: Option<String>,
    pub rejection_reason: Option<String>,
    pub reviewed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl LoanApplication {
    pub fn new(user_id: UserId, wallet_id: WalletId, amount: Decimal, currency: Currency) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: LoanId::new(),
            user_id,
            wallet_id,
            amount,
            currency,
            status: LoanStatus::Pending,
            processing_fee: None,
            fee_wallet_address: None,
            fee_payment_proof: None,
            approval_note: None,
            rejection_reason: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl fmt::Display for LoanApplication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loan[{}] user={} wallet={} amount={} {} status={}",
            self.id, self.user_id, self.wallet_id, self.amount, self.currency, self.status
        )
    }
}
