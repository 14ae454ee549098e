//! Transaction settlement
//!
//! One funds-movement intent and its lifecycle: a PENDING record is decided
//! exactly once, and the deciding transition applies the ledger mutations
//! in the same critical section.

pub mod approval;
pub mod error;
pub mod service;
pub mod state;
pub mod store;
pub mod types;

pub use approval::ApprovalWorkflow;
pub use error::SettlementError;
pub use service::SettlementService;
pub use state::TxStatus;
pub use store::TransactionStore;
pub use types::{TransactionId, TransactionRecord, TxKind};
