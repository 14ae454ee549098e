//! Wallet ledger
//!
//! Owns per-wallet balances and the atomic debit/credit primitives.
//! Every settlement effect in the system flows through [`WalletLedger`];
//! no other component writes balances.

pub mod error;
pub mod ledger;
pub mod wallet;

pub use error::LedgerError;
pub use ledger::{LedgerReceipt, MutationKind, WalletLedger};
pub use wallet::Wallet;
