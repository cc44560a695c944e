//! Transaction aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{Currency, Provider, TransactionId};

/// Transaction type classification.
///
/// Categorizes the money movement a transaction represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// A customer payment captured for a booking.
    BookingPayment,
    /// Settlement payout to a provider.
    ProviderPayout,
    /// Refund of a captured payment.
    Refund,
    /// Fee collection (platform or provider fees).
    FeeCollection,
    /// Funds frozen while a dispute is open.
    DisputeFreeze,
    /// Frozen funds released after a dispute is won.
    DisputeUnfreeze,
    /// Manual correction entry.
    Adjustment,
}

/// Transaction lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Created, entries not yet visible.
    Pending,
    /// Entries posted and balances applied.
    Completed,
    /// Posting failed; no entries are visible.
    Failed,
}

impl TransactionStatus {
    /// Returns true if the transaction has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if the transaction's entries count toward balances.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// A financial transaction consisting of balanced ledger entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// What kind of money movement this is.
    pub transaction_type: TransactionType,
    /// Current lifecycle status.
    pub status: TransactionStatus,
    /// Identifier of the external object this represents
    /// (provider charge id, payout id, refund id).
    pub reference: String,
    /// The provider this transaction settles with, when applicable.
    pub provider: Option<Provider>,
    /// Caller-supplied natural key for duplicate suppression.
    pub idempotency_key: Option<String>,
    /// Transaction currency. All entries share it.
    pub currency: Currency,
    /// Total amount moved, in minor units (the sum of one side's entries).
    pub total_amount_minor: i64,
    /// When the transaction was created.
    pub created_at: DateTime<Utc>,
    /// When the transaction reached Completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Returns true if this transaction's entries are visible to readers.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.status.is_visible()
    }
}
