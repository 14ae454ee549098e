//! Aegis Bank - Digital-Banking Funds-Movement Core
//!
//! The hard subsystem of a digital-banking platform: the wallet ledger,
//! the transaction-approval state machine, and the multi-factor
//! pre-authorization flow in front of transfers. Money is never created,
//! destroyed, or moved twice; every decision applies exactly once.
//!
//! # Modules
//!
//! - [`core_types`] - Core type aliases (UserId, WalletId, AdminId)
//! - [`money`] - Strict amount parsing and the Currency type
//! - [`ledger`] - WalletLedger: atomic, idempotent debit/credit primitives
//! - [`settlement`] - TransactionRecord FSM, settlement, approval workflow
//! - [`funding`] - Deposit/withdrawal intake
//! - [`preauth`] - OTP challenges, transfer codes, the composed gate
//! - [`loan`] - LoanApplication FSM with the fee gate and disbursement
//! - [`fx`] - Injected exchange-rate collaborator with TTL cache
//! - [`notify`] - Fire-and-forget status-change event sink
//! - [`gateway`] - axum HTTP surface

// Core types - must be first!
pub mod core_types;

pub mod config;
pub mod logging;
pub mod money;

// Collaborators
pub mod fx;
pub mod notify;

// Funds-movement core
pub mod funding;
pub mod ledger;
pub mod loan;
pub mod preauth;
pub mod settlement;

// HTTP surface
pub mod gateway;

// Convenient re-exports at crate root
pub use core_types::{AdminId, UserId, WalletId};
pub use fx::{FixedRateSource, FxCache, RateSource};
pub use ledger::{LedgerError, LedgerReceipt, Wallet, WalletLedger};
pub use loan::{LoanApplication, LoanError, LoanId, LoanService, LoanStatus};
pub use money::{Currency, MoneyError};
pub use notify::{ChannelSink, MemorySink, NoopSink, Notification, NotificationSink};
pub use preauth::{
    ChallengeId, OtpService, PendingTransfer, PreAuthError, PreAuthorizationGate,
    TransferCodeRegistry, TransferCodeType,
};
pub use settlement::{
    ApprovalWorkflow, SettlementError, SettlementService, TransactionId, TransactionRecord,
    TransactionStore, TxKind, TxStatus,
};
