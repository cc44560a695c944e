//! Store error types.

use thiserror::Error;
use tally_shared::types::{AccountId, TransactionId};

/// Errors surfaced by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// An account's version changed between read and commit.
    ///
    /// The caller should re-read and retry the whole posting.
    #[error("Version conflict on account {account_id}: expected {expected}, found {actual}")]
    VersionConflict {
        /// The account whose version moved.
        account_id: AccountId,
        /// The version the commit was computed against.
        expected: i64,
        /// The version found at commit time.
        actual: i64,
    },

    /// A completed transaction already holds this idempotency key.
    #[error("Idempotency key already used by transaction {0}")]
    IdempotencyKeyTaken(TransactionId),
}
