//! Dispute aggregate and state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{Currency, DisputeId, Money, Provider, TransactionId};

use super::error::DisputeError;
use super::event::DisputeOutcome;

/// Dispute lifecycle status.
///
/// `UnderReview` is the only non-terminal state; provider events move a
/// dispute to exactly one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    /// Dispute is open; disputed funds are frozen.
    UnderReview,
    /// Platform prevailed; frozen funds were released.
    Won,
    /// Platform lost; frozen funds remain in the dispute reserve.
    Lost,
    /// Dispute closed without a clear outcome; needs manual follow-up.
    Closed,
}

impl DisputeStatus {
    /// Returns true once the dispute has reached a terminal state.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        !matches!(self, Self::UnderReview)
    }

    /// The terminal status a provider outcome maps to.
    #[must_use]
    pub const fn from_outcome(outcome: DisputeOutcome) -> Self {
        match outcome {
            DisputeOutcome::Won => Self::Won,
            DisputeOutcome::Lost => Self::Lost,
            DisputeOutcome::Unknown => Self::Closed,
        }
    }
}

/// Why the cardholder disputed the charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeReason {
    /// Cardholder claims the charge was fraudulent.
    Fraudulent,
    /// Cardholder claims the product was never received.
    ProductNotReceived,
    /// Cardholder does not recognize the charge.
    Unrecognized,
    /// Cardholder claims a promised credit never arrived.
    CreditNotProcessed,
    /// Anything the provider vocabulary does not map.
    Other,
}

/// A dispute raised by a provider against a platform transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    /// Unique identifier.
    pub id: DisputeId,
    /// The provider the dispute arrived from.
    pub provider: Provider,
    /// The provider's identifier for this dispute. Unique per provider;
    /// all lifecycle events for one dispute carry the same value.
    pub provider_dispute_id: String,
    /// The internal transaction being disputed.
    pub transaction_id: TransactionId,
    /// Current lifecycle status.
    pub status: DisputeStatus,
    /// Normalized dispute reason.
    pub reason: DisputeReason,
    /// Disputed amount in minor units.
    pub disputed_amount_minor: i64,
    /// Dispute currency.
    pub currency: Currency,
    /// Deadline for submitting evidence, if the provider gave one.
    pub evidence_due_by: Option<DateTime<Utc>>,
    /// When the dispute was opened.
    pub opened_at: DateTime<Utc>,
    /// When the dispute reached a terminal state.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Dispute {
    /// The disputed amount as money.
    #[must_use]
    pub const fn disputed_amount(&self) -> Money {
        Money::new(self.disputed_amount_minor, self.currency)
    }

    /// Applies a provider outcome, moving the dispute to a terminal state.
    ///
    /// # Errors
    ///
    /// Returns `DisputeError::AlreadyResolved` if the dispute has already
    /// left `UnderReview`; lifecycle events are idempotent at the caller.
    pub fn resolve(&mut self, outcome: DisputeOutcome, at: DateTime<Utc>) -> Result<(), DisputeError> {
        if self.status.is_resolved() {
            return Err(DisputeError::AlreadyResolved {
                provider_dispute_id: self.provider_dispute_id.clone(),
                status: self.status,
            });
        }

        self.status = DisputeStatus::from_outcome(outcome);
        self.resolved_at = Some(at);
        Ok(())
    }
}
