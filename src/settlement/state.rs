//! Settlement FSM State Definitions

use std::fmt;

/// TransactionRecord lifecycle states
///
/// PENDING -> {COMPLETED, FAILED}; both outcomes are terminal and no
/// transition ever leaves a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum TxStatus {
    /// Created and waiting for an admin decision
    Pending = 0,

    /// Terminal: decided and ledger-settled
    Completed = 10,

    /// Terminal: decided with no ledger effect (or ledger-rejected)
    Failed = -10,
}

impl TxStatus {
    /// Check if this is a terminal state (no more transitions possible)
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxStatus::Completed | TxStatus::Failed)
    }

    /// Numeric state ID for storage and wire use
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(TxStatus::Pending),
            10 => Some(TxStatus::Completed),
            -10 => Some(TxStatus::Failed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Pending => "PENDING",
            TxStatus::Completed => "COMPLETED",
            TxStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i16> for TxStatus {
    type Error = ();

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        TxStatus::from_id(value).ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(TxStatus::Completed.is_terminal());
        assert!(TxStatus::Failed.is_terminal());
        assert!(!TxStatus::Pending.is_terminal());
    }

    #[test]
    fn test_state_id_roundtrip() {
        for status in [TxStatus::Pending, TxStatus::Completed, TxStatus::Failed] {
            assert_eq!(TxStatus::from_id(status.id()), Some(status));
        }
        assert!(TxStatus::from_id(99).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(TxStatus::Pending.to_string(), "PENDING");
        assert_eq!(TxStatus::Completed.to_string(), "COMPLETED");
        assert_eq!(TxStatus::Failed.to_string(), "FAILED");
    }
}
