//! Provider dispute webhook events.
//!
//! Events arrive at-least-once and out of order; everything here carries
//! the provider's raw vocabulary, normalized later through the mapping
//! tables.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{Currency, Provider};

/// Outcome of a closed dispute, from the platform's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeOutcome {
    /// The platform prevailed; frozen funds are released.
    Won,
    /// The platform lost; frozen funds stay in the dispute reserve.
    Lost,
    /// The provider reported something we cannot map; manual follow-up.
    Unknown,
}

/// A dispute lifecycle event as delivered by a provider webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisputeEvent {
    /// The provider that sent the event.
    pub provider: Provider,
    /// The provider's identifier for the dispute.
    pub provider_dispute_id: String,
    /// The provider's identifier for the disputed transaction.
    pub provider_transaction_id: String,
    /// What happened.
    pub kind: DisputeEventKind,
    /// When the provider says it happened.
    pub occurred_at: DateTime<Utc>,
}

/// The lifecycle step an event represents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DisputeEventKind {
    /// A new dispute was opened.
    Created {
        /// Provider's raw reason string.
        reason: String,
        /// Disputed amount in major units, as the provider reports it.
        amount: Decimal,
        /// Dispute currency.
        currency: Currency,
        /// Evidence submission deadline, if any.
        evidence_due_by: Option<DateTime<Utc>>,
    },
    /// The dispute moved to another provider-side status.
    Updated {
        /// Provider's raw status string.
        status: String,
    },
    /// The dispute was closed or resolved.
    Closed {
        /// Provider's raw outcome string.
        outcome: String,
    },
}
