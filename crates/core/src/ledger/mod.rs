//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Accounts with classification-driven sign conventions
//! - Immutable ledger entries (debits and credits)
//! - Transaction aggregates with the Pending/Completed/Failed lifecycle
//! - Posting validation (the single write-time enforcement point for the
//!   double-entry invariant)
//! - Error types for ledger operations

pub mod account;
pub mod entry;
pub mod error;
pub mod posting;
pub mod transaction;

#[cfg(test)]
mod posting_props;

pub use account::{Account, AccountCategory, AccountKey, BalanceSide, OwnerType};
pub use entry::{EntryDirection, LedgerEntry};
pub use error::LedgerError;
pub use posting::{validate_posting, PostingLeg, PostingRequest, PostingTotals};
pub use transaction::{Transaction, TransactionStatus, TransactionType};
