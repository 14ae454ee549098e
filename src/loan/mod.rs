//! Loan applications
//!
//! A nested state machine on top of the generic settlement path: an
//! optional processing-fee collection step sits between loan request and
//! approval, and disbursement is the single transition that credits the
//! borrower's wallet.

pub mod error;
pub mod service;
pub mod state;
pub mod types;

pub use error::LoanError;
pub use service::LoanService;
pub use state::LoanStatus;
pub use types::{LoanApplication, LoanId};
