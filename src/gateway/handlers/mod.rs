//! Gateway handlers, grouped by surface

pub mod admin;
pub mod funding;
pub mod health;
pub mod helpers;
pub mod loan;
pub mod query;
pub mod transfer;
pub mod wallet;

pub use admin::{approve_transaction, issue_transfer_code, reject_transaction, reset_transfer_code};
pub use funding::{submit_deposit, submit_withdrawal};
pub use health::{HealthResponse, health_check};
pub use loan::{
    apply_loan, approve_loan, disburse_loan, get_loan, propose_loan, reject_loan,
    request_loan_fee, submit_fee_proof, verify_loan_fee,
};
pub use query::get_transaction;
pub use transfer::{begin_transfer, complete_transfer, request_transfer_code, verify_transfer_code};
pub use wallet::{get_wallet, open_wallet};
