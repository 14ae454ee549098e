//! Gateway application state (shared)

use std::sync::Arc;

use crate::config::PreAuthConfig;
use crate::funding::FundingService;
use crate::fx::RateSource;
use crate::ledger::WalletLedger;
use crate::loan::LoanService;
use crate::notify::NotificationSink;
use crate::preauth::{OtpService, PreAuthorizationGate, TransferCodeRegistry, TransferCodeType};
use crate::settlement::{ApprovalWorkflow, SettlementService, TransactionStore};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<WalletLedger>,
    pub transactions: Arc<TransactionStore>,
    pub approval: Arc<ApprovalWorkflow>,
    pub funding: Arc<FundingService>,
    pub otp: Arc<OtpService>,
    pub codes: Arc<TransferCodeRegistry>,
    pub gate: Arc<PreAuthorizationGate>,
    pub loans: Arc<LoanService>,
}

impl AppState {
    /// Wire the full service graph from its injected collaborators.
    pub fn assemble(
        preauth: &PreAuthConfig,
        rates: Arc<dyn RateSource>,
        sink: Arc<dyn NotificationSink>,
    ) -> Arc<Self> {
        let ledger = Arc::new(WalletLedger::new());
        let transactions = Arc::new(TransactionStore::new());
        let settlement = Arc::new(SettlementService::new(
            transactions.clone(),
            ledger.clone(),
            rates,
            sink.clone(),
        ));
        let approval = Arc::new(ApprovalWorkflow::new(settlement.clone()));
        let funding = Arc::new(FundingService::new(transactions.clone(), ledger.clone()));
        let otp = Arc::new(OtpService::new(
            preauth.otp_ttl_secs,
            preauth.otp_max_attempts,
            sink.clone(),
        ));
        let codes = Arc::new(TransferCodeRegistry::new(sink.clone()));
        let required_codes: Vec<TransferCodeType> = preauth
            .required_transfer_codes
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        let gate = Arc::new(PreAuthorizationGate::new(
            otp.clone(),
            codes.clone(),
            transactions.clone(),
            ledger.clone(),
            required_codes,
        ));
        let loans = Arc::new(LoanService::new(settlement, sink));

        Arc::new(Self {
            ledger,
            transactions,
            approval,
            funding,
            otp,
            codes,
            gate,
            loans,
        })
    }
}
