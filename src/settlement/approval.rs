//! Approval Workflow
//!
//! The admin-facing decision surface over the settlement FSM. One generic
//! surface covers every record kind: deposits, withdrawals, transfers and
//! loan disbursements all take the same approve/reject path.

use std::sync::Arc;

use super::error::SettlementError;
use super::service::SettlementService;
use super::state::TxStatus;
use super::types::TransactionId;
use crate::core_types::AdminId;

pub struct ApprovalWorkflow {
    settlement: Arc<SettlementService>,
}

impl ApprovalWorkflow {
    pub fn new(settlement: Arc<SettlementService>) -> Self {
        Self { settlement }
    }

    /// Approve a pending record: settles it, applying the ledger
    /// mutations. Concurrent duplicate approvals get `AlreadyProcessed`.
    pub fn approve(
        &self,
        tx_id: TransactionId,
        decided_by: AdminId,
    ) -> Result<TxStatus, SettlementError> {
        self.settlement.settle(tx_id, decided_by)
    }

    /// Reject a pending record. `reason` is mandatory and stored verbatim
    /// for audit.
    pub fn reject(
        &self,
        tx_id: TransactionId,
        decided_by: AdminId,
        reason: &str,
    ) -> Result<TxStatus, SettlementError> {
        self.settlement.fail(tx_id, decided_by, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::FixedRateSource;
    use crate::ledger::WalletLedger;
    use crate::money::Currency;
    use crate::notify::NoopSink;
    use crate::settlement::store::TransactionStore;
    use crate::settlement::types::TransactionRecord;
    use rust_decimal_macros::dec;

    fn workflow() -> (ApprovalWorkflow, Arc<TransactionStore>, Arc<WalletLedger>) {
        let store = Arc::new(TransactionStore::new());
        let ledger = Arc::new(WalletLedger::new());
        let settlement = Arc::new(SettlementService::new(
            store.clone(),
            ledger.clone(),
            Arc::new(FixedRateSource::new()),
            Arc::new(NoopSink),
        ));
        (ApprovalWorkflow::new(settlement), store, ledger)
    }

    #[test]
    fn test_approve_settles_transfer() {
        let (workflow, store, ledger) = workflow();
        let usd = Currency::new("USD");
        let a = ledger.open_wallet_with_balance(1, usd.clone(), dec!(1000));
        let b = ledger.open_wallet_with_balance(2, usd.clone(), dec!(200));
        let id = store
            .insert(TransactionRecord::transfer(a, b, dec!(500), usd, "t-1".into()))
            .unwrap();

        assert_eq!(workflow.approve(id, 9).unwrap(), TxStatus::Completed);
        assert_eq!(ledger.balance(a).unwrap(), dec!(500));
        assert_eq!(ledger.balance(b).unwrap(), dec!(700));
    }

    #[test]
    fn test_reject_requires_reason_and_is_terminal() {
        let (workflow, store, ledger) = workflow();
        let usd = Currency::new("USD");
        let a = ledger.open_wallet_with_balance(1, usd.clone(), dec!(1000));
        let id = store
            .insert(TransactionRecord::withdrawal(a, dec!(100), usd, "w-1".into()))
            .unwrap();

        assert!(matches!(
            workflow.reject(id, 9, ""),
            Err(SettlementError::ReasonRequired)
        ));
        assert_eq!(workflow.reject(id, 9, "kyc hold").unwrap(), TxStatus::Failed);
        // Terminal: a later approve is a no-op
        assert!(matches!(
            workflow.approve(id, 9),
            Err(SettlementError::AlreadyProcessed)
        ));
        assert_eq!(ledger.balance(a).unwrap(), dec!(1000));
    }
}
