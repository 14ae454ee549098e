//! Loan FSM State Definitions

use std::fmt;

/// LoanApplication lifecycle states
///
/// ```text
/// PENDING ──requestFee──▶ FEE_PENDING ──submitFeeProof──▶ FEE_PAID
///    │                        │                              │
///    │ approve                │ reject                       │ verifyFee
///    ▼                        ▼                              ▼
/// APPROVED ◀──────────────────┼──────────────────────── APPROVED
///    │                        ▼
///    │ disburse           REJECTED (terminal)
///    ▼
///  ACTIVE ──▶ COMPLETED / DEFAULTED (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum LoanStatus {
    /// Requested and waiting for review
    Pending = 0,

    /// Admin asked for a processing fee; waiting on the user
    FeePending = 10,

    /// User submitted proof of fee payment; waiting on admin verification
    FeePaid = 20,

    /// Cleared for disbursement
    Approved = 30,

    /// Principal credited; repayment tracking owns it now
    Active = 40,

    /// Terminal: repaid in full
    Completed = 50,

    /// Terminal: turned down
    Rejected = -10,

    /// Terminal: written off
    Defaulted = -20,
}

impl LoanStatus {
    /// Check if this is a terminal state (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoanStatus::Rejected | LoanStatus::Completed | LoanStatus::Defaulted
        )
    }

    /// States an admin may still reject from
    #[inline]
    pub fn is_rejectable(&self) -> bool {
        matches!(
            self,
            LoanStatus::Pending | LoanStatus::FeePending | LoanStatus::FeePaid
        )
    }

    /// Numeric state ID for storage and wire use
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(LoanStatus::Pending),
            10 => Some(LoanStatus::FeePending),
            20 => Some(LoanStatus::FeePaid),
            30 => Some(LoanStatus::Approved),
            40 => Some(LoanStatus::Active),
            50 => Some(LoanStatus::Completed),
            -10 => Some(LoanStatus::Rejected),
            -20 => Some(LoanStatus::Defaulted),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "PENDING",
            LoanStatus::FeePending => "FEE_PENDING",
            LoanStatus::FeePaid => "FEE_PAID",
            LoanStatus::Approved => "APPROVED",
            LoanStatus::Active => "ACTIVE",
            LoanStatus::Completed => "COMPLETED",
            LoanStatus::Rejected => "REJECTED",
            LoanStatus::Defaulted => "DEFAULTED",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i16> for LoanStatus {
    type Error = ();

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        LoanStatus::from_id(value).ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [LoanStatus; 8] = [
        LoanStatus::Pending,
        LoanStatus::FeePending,
        LoanStatus::FeePaid,
        LoanStatus::Approved,
        LoanStatus::Active,
        LoanStatus::Completed,
        LoanStatus::Rejected,
        LoanStatus::Defaulted,
    ];

    #[test]
    fn test_terminal_states() {
        assert!(LoanStatus::Rejected.is_terminal());
        assert!(LoanStatus::Completed.is_terminal());
        assert!(LoanStatus::Defaulted.is_terminal());
        assert!(!LoanStatus::Pending.is_terminal());
        assert!(!LoanStatus::Approved.is_terminal());
        assert!(!LoanStatus::Active.is_terminal());
    }

    #[test]
    fn test_rejectable_states() {
        assert!(LoanStatus::Pending.is_rejectable());
        assert!(LoanStatus::FeePending.is_rejectable());
        assert!(LoanStatus::FeePaid.is_rejectable());
        assert!(!LoanStatus::Approved.is_rejectable());
        assert!(!LoanStatus::Active.is_rejectable());
        assert!(!LoanStatus::Rejected.is_rejectable());
    }

    #[test]
    fn test_state_id_roundtrip() {
        for status in ALL {
            assert_eq!(LoanStatus::from_id(status.id()), Some(status));
        }
        assert!(LoanStatus::from_id(99).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(LoanStatus::FeePending.to_string(), "FEE_PENDING");
        assert_eq!(LoanStatus::Active.to_string(), "ACTIVE");
    }
}
