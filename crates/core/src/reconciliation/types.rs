//! Reconciliation domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{Currency, Provider, ReconciliationJobId, TransactionId};

use crate::ledger::TransactionStatus;

/// A transaction as the provider reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderTransaction {
    /// The provider's transaction identifier (the shared matching key).
    pub id: String,
    /// Amount in major units, as reported.
    pub amount: Decimal,
    /// Transaction currency.
    pub currency: Currency,
    /// The provider's raw status string.
    pub status: String,
    /// When the provider says the transaction happened.
    pub timestamp: DateTime<Utc>,
}

/// Our side of the comparison: a journal transaction reduced to the
/// fields reconciliation needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalTransaction {
    /// The journal transaction id.
    pub transaction_id: TransactionId,
    /// The provider's transaction identifier (the shared matching key).
    pub provider_ref: String,
    /// Amount in minor units.
    pub amount_minor: i64,
    /// Transaction currency.
    pub currency: Currency,
    /// Journal lifecycle status.
    pub status: TransactionStatus,
}

/// How the two sides disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    /// Exists at the provider, not in our ledger.
    ExtraTransaction,
    /// Exists in our ledger, not at the provider.
    MissingTransaction,
    /// Both sides have it but the amounts differ beyond tolerance.
    AmountMismatch,
    /// Both sides have it but the statuses disagree.
    StatusMismatch,
}

/// Severity of a discrepancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only.
    Low,
    /// Needs attention.
    Medium,
    /// Money movement we cannot account for; alert + ticket.
    High,
}

/// A classified disagreement between the two sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    /// How the sides disagree.
    pub kind: DiscrepancyKind,
    /// How bad it is.
    pub severity: Severity,
    /// The provider transaction id the finding is about.
    pub provider_transaction_id: String,
    /// Our amount in major units, if we have the transaction.
    pub our_amount: Option<Decimal>,
    /// The provider's amount in major units, if they have it.
    pub their_amount: Option<Decimal>,
    /// Signed difference (theirs minus ours) in major units.
    pub difference: Decimal,
    /// Human-readable detail for the alert/ticket.
    pub detail: String,
}

/// Reconciliation job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is running.
    Processing,
    /// Finished; the two sides agree.
    Completed,
    /// Finished; discrepancies were recorded.
    CompletedWithDiscrepancies,
    /// The provider feed failed; nothing was compared.
    Failed,
}

/// One reconciliation run over a (provider, window) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationJob {
    /// Unique identifier.
    pub id: ReconciliationJobId,
    /// The provider reconciled.
    pub provider: Provider,
    /// First day of the window (inclusive).
    pub period_start: NaiveDate,
    /// Last day of the window (exclusive).
    pub period_end: NaiveDate,
    /// Current status.
    pub status: JobStatus,
    /// Number of journal transactions in the window.
    pub ours_count: usize,
    /// Number of provider-reported transactions in the window.
    pub theirs_count: usize,
    /// Sum of our amounts in major units.
    pub ours_total: Decimal,
    /// Sum of provider amounts in major units.
    pub theirs_total: Decimal,
    /// When the job started.
    pub started_at: DateTime<Utc>,
    /// When the job finished.
    pub finished_at: Option<DateTime<Utc>>,
}
