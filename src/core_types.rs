//! Core types used throughout the system
//!
//! Fundamental type aliases shared by all modules. They carry semantic
//! meaning and leave room for future type evolution.

/// User ID - globally unique, immutable after assignment.
///
/// Primary key for account holders; used in keyed maps for O(1) lookup.
pub type UserId = u64;

/// Wallet ID - globally unique identifier for a balance-holding wallet.
///
/// Assigned once at wallet creation and never reused. Wallets are never
/// deleted, only frozen by an external status flag.
pub type WalletId = u64;

/// Admin ID - identifies the operator behind an approval decision.
///
/// Recorded verbatim on the transition that actually succeeds.
pub type AdminId = u64;
