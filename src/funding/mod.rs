//! Deposit/withdrawal intake
//!
//! Validates external funds-movement requests and parks them as PENDING
//! transaction records for the approval workflow. No balance moves at
//! intake time.

pub mod error;
pub mod service;

pub use error::FundingError;
pub use service::FundingService;
