//! Pre-authorization gate
//!
//! Two composable sub-gates run before a transfer is admitted to the
//! approval queue: an OTP challenge (proof of channel control) and,
//! where configured, admin-issued transfer codes (COT/IMF/TAX). Only
//! after both succeed is a PENDING transfer record created, built from the
//! parameters captured at challenge time, never re-read from the client.

pub mod error;
pub mod gate;
pub mod otp;
pub mod transfer_code;

pub use error::PreAuthError;
pub use gate::{PendingTransfer, PreAuthorizationGate, TRANSFER_PURPOSE};
pub use otp::{ChallengeId, OtpChallenge, OtpService};
pub use transfer_code::{TransferCode, TransferCodeRegistry, TransferCodeType};
