//! Ledger entry domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, Currency, LedgerEntryId, TransactionId};

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryDirection {
    /// Debit entry (increases asset/expense accounts, decreases liability/revenue accounts).
    Debit,
    /// Credit entry (decreases asset/expense accounts, increases liability/revenue accounts).
    Credit,
}

/// A single ledger entry. Immutable once created.
///
/// Each transaction consists of multiple entries that must balance
/// (debits = credits).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier for this entry.
    pub id: LedgerEntryId,
    /// The transaction this entry belongs to.
    /// `None` only for system-level entries.
    pub transaction_id: Option<TransactionId>,
    /// The account affected by this entry.
    pub account_id: AccountId,
    /// Whether this is a debit or credit.
    pub direction: EntryDirection,
    /// Amount in minor units. Always positive.
    pub amount_minor: i64,
    /// Entry currency.
    pub currency: Currency,
    /// Human-readable description.
    pub description: String,
    /// When the underlying money movement took effect.
    pub event_at: DateTime<Utc>,
    /// Set by the nightly verifier once the entry has passed verification.
    pub verified: bool,
}

impl LedgerEntry {
    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub const fn signed_amount(&self) -> i64 {
        match self.direction {
            EntryDirection::Debit => self.amount_minor,
            EntryDirection::Credit => -self.amount_minor,
        }
    }

    /// Returns the debit amount, or zero for credit entries.
    #[must_use]
    pub const fn debit_minor(&self) -> i64 {
        match self.direction {
            EntryDirection::Debit => self.amount_minor,
            EntryDirection::Credit => 0,
        }
    }

    /// Returns the credit amount, or zero for debit entries.
    #[must_use]
    pub const fn credit_minor(&self) -> i64 {
        match self.direction {
            EntryDirection::Debit => 0,
            EntryDirection::Credit => self.amount_minor,
        }
    }
}
