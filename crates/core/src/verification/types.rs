//! Verification result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which of the four ledger checks a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Global debits == credits, per currency.
    GlobalBalance,
    /// Stored account balances match balances derived from entries.
    AccountBalances,
    /// Every entry belongs to a valid, visible transaction.
    OrphanEntries,
    /// Every transaction's own entries net to zero.
    TransactionConsistency,
}

/// One concrete verification failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    /// The check that failed.
    pub check: CheckKind,
    /// What exactly is wrong (account, transaction, currency, magnitude).
    pub detail: String,
}

/// Outcome of a full verification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Global debits == credits held for every currency.
    pub balanced: bool,
    /// Every stored balance matched its derived balance and domain rule.
    pub accounts_valid: bool,
    /// No entry referenced a missing or failed transaction.
    pub no_orphans: bool,
    /// Every transaction's entries netted to zero on their own.
    pub transactions_consistent: bool,
    /// When the run finished.
    pub checked_at: DateTime<Utc>,
    /// Structured detail for every failure, for the alert payload.
    pub failures: Vec<CheckFailure>,
}

impl VerificationResult {
    /// Returns true only if all four checks passed.
    #[must_use]
    pub const fn is_all_valid(&self) -> bool {
        self.balanced && self.accounts_valid && self.no_orphans && self.transactions_consistent
    }

    /// Builds a result from the four failure lists.
    #[must_use]
    pub fn from_failures(
        balance_failures: Vec<CheckFailure>,
        account_failures: Vec<CheckFailure>,
        orphan_failures: Vec<CheckFailure>,
        consistency_failures: Vec<CheckFailure>,
        checked_at: DateTime<Utc>,
    ) -> Self {
        let balanced = balance_failures.is_empty();
        let accounts_valid = account_failures.is_empty();
        let no_orphans = orphan_failures.is_empty();
        let transactions_consistent = consistency_failures.is_empty();

        let mut failures = balance_failures;
        failures.extend(account_failures);
        failures.extend(orphan_failures);
        failures.extend(consistency_failures);

        Self {
            balanced,
            accounts_valid,
            no_orphans,
            transactions_consistent,
            checked_at,
            failures,
        }
    }
}
