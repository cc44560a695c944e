//! External collaborator seams.
//!
//! The core consumes three things from the outside world: a feed of
//! provider-reported transactions, a sink for human-readable alerts, and a
//! ticketing system for operational escalations. Each is a trait so the
//! binary can wire real integrations while tests wire stubs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use tally_core::reconciliation::ProviderTransaction;
use tally_shared::types::{Provider, TicketId};

/// Alert categories, one per subsystem that can raise them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCategory {
    /// A nightly or on-demand verification run failed a check.
    LedgerVerification,
    /// A reconciliation job failed or found high-severity discrepancies.
    Reconciliation,
    /// A dispute event needs human attention.
    Dispute,
}

impl std::fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LedgerVerification => write!(f, "ledger-verification"),
            Self::Reconciliation => write!(f, "reconciliation"),
            Self::Dispute => write!(f, "dispute"),
        }
    }
}

/// Support ticket categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketKind {
    /// A high-severity reconciliation discrepancy.
    ReconciliationDiscrepancy,
    /// A dispute arrived for a transaction we have no record of.
    UnknownDisputeTransaction,
    /// A dispute above the high-value threshold.
    HighValueDispute,
    /// A dispute closed without a mappable outcome.
    DisputeFollowUp,
}

/// Ticket priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketPriority {
    /// Routine follow-up.
    Normal,
    /// Operational emergency.
    High,
}

/// Provider feed failure.
///
/// Callers never crash on these: a feed error degrades to an empty
/// statement and a Failed job.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The provider could not be reached.
    #[error("Provider feed unavailable: {0}")]
    Unavailable(String),

    /// The provider responded with something we could not parse.
    #[error("Provider feed returned malformed data: {0}")]
    Malformed(String),
}

/// Ticketing failure. Logged and swallowed by every caller.
#[derive(Debug, Error)]
pub enum TicketingError {
    /// The ticketing system could not be reached.
    #[error("Ticketing unavailable: {0}")]
    Unavailable(String),
}

/// A feed of provider-reported transactions for a date range.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProviderFeed: Send + Sync {
    /// Lists the provider's transactions within `[start, end)`.
    async fn list_transactions(
        &self,
        provider: Provider,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ProviderTransaction>, FeedError>;
}

/// A sink for human-readable alerts. Fire-and-forget: implementations
/// swallow their own delivery failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Raises one alert.
    async fn alert(&self, category: AlertCategory, summary: &str, detail: &str);
}

/// Files support tickets for operational escalations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Ticketing: Send + Sync {
    /// Files one ticket and returns its id.
    async fn file_ticket(
        &self,
        kind: TicketKind,
        description: &str,
        priority: TicketPriority,
    ) -> Result<TicketId, TicketingError>;
}
