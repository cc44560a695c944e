//! In-memory persistence for Tally.
//!
//! This crate realizes the persistence contract the core needs: versioned
//! accounts, append-only ledger entries, transactions with idempotency-key
//! lookup, disputes, and reconciliation jobs. The ledger store provides the
//! atomic posting unit (entry creation, balance application, and the
//! status flip commit together or not at all) with per-account optimistic
//! version checks so concurrent postings to the same account are detected
//! and retried by the caller.

pub mod disputes;
pub mod error;
pub mod ledger;
pub mod reconciliation;

pub use disputes::DisputeStore;
pub use error::StoreError;
pub use ledger::{AccountDelta, LedgerSnapshot, LedgerStore, PostingCommit};
pub use reconciliation::{DiscrepancyRecord, ReconciliationStore};
