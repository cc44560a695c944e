//! Ledger error types for validation and posting errors.
//!
//! This module defines all errors that can occur during ledger operations:
//! posting validation, account resolution, balance policy, and concurrency
//! conflicts detected at commit time.

use thiserror::Error;
use tally_shared::types::{AccountId, Currency, TransactionId};

use super::account::AccountCategory;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Posting Validation Errors ==========
    /// Posting has no legs.
    #[error("Posting must have at least one debit and one credit leg")]
    EmptyPosting,

    /// Posting has only one side (all debits or all credits).
    #[error("Posting must have both debit and credit legs")]
    SingleSidedPosting,

    /// Leg amount is zero or negative.
    #[error("Leg amount must be positive")]
    NonPositiveAmount,

    /// Posting does not net to zero.
    #[error("Posting is unbalanced. Debits: {debits}, Credits: {credits}")]
    UnbalancedPosting {
        /// Total debit amount in minor units.
        debits: i64,
        /// Total credit amount in minor units.
        credits: i64,
    },

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// A fixed platform system account is missing.
    ///
    /// System accounts are provisioned at startup, never lazily; their
    /// absence is fatal.
    #[error("System account missing: {category:?} in {currency}")]
    SystemAccountMissing {
        /// The missing account's classification.
        category: AccountCategory,
        /// The missing account's currency.
        currency: Currency,
    },

    // ========== Balance Policy Errors ==========
    /// Posting would drive an asset-like account negative.
    #[error(
        "Insufficient balance on account {account_id}: balance {balance_minor}, requested {requested_minor}"
    )]
    InsufficientBalance {
        /// The account that would go negative.
        account_id: AccountId,
        /// Current balance in minor units.
        balance_minor: i64,
        /// Amount the posting would remove, in minor units.
        requested_minor: i64,
    },

    // ========== Transaction Errors ==========
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    // ========== Concurrency Errors ==========
    /// Account version changed between read and commit.
    #[error("Account version mismatch for account {account_id}: expected {expected}, got {actual}")]
    AccountVersionMismatch {
        /// The account ID.
        account_id: AccountId,
        /// The version the posting was computed against.
        expected: i64,
        /// The version found at commit.
        actual: i64,
    },

    /// Concurrent modification detected after retries were exhausted.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    // ========== Storage Errors ==========
    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Returns the error code for operator-facing summaries.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyPosting => "EMPTY_POSTING",
            Self::SingleSidedPosting => "SINGLE_SIDED_POSTING",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::UnbalancedPosting { .. } => "UNBALANCED_POSTING",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::SystemAccountMissing { .. } => "SYSTEM_ACCOUNT_MISSING",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::AccountVersionMismatch { .. } => "ACCOUNT_VERSION_MISMATCH",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns true if the caller should retry the whole posting.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::AccountVersionMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::UnbalancedPosting {
                debits: 100,
                credits: 50
            }
            .error_code(),
            "UNBALANCED_POSTING"
        );
        assert_eq!(LedgerError::EmptyPosting.error_code(), "EMPTY_POSTING");
        assert_eq!(
            LedgerError::AccountNotFound(AccountId::new()).error_code(),
            "ACCOUNT_NOT_FOUND"
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LedgerError::AccountVersionMismatch {
            account_id: AccountId::new(),
            expected: 1,
            actual: 2,
        }
        .is_retryable());
        assert!(!LedgerError::ConcurrentModification.is_retryable());
        assert!(!LedgerError::EmptyPosting.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::UnbalancedPosting {
            debits: 10_000,
            credits: 5_000,
        };
        assert_eq!(
            err.to_string(),
            "Posting is unbalanced. Debits: 10000, Credits: 5000"
        );
    }
}
