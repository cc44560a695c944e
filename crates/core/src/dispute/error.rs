//! Dispute error types.

use rust_decimal::Decimal;
use thiserror::Error;
use tally_shared::types::{Currency, Provider};

use crate::ledger::LedgerError;

use super::types::DisputeStatus;

/// Errors that can occur while handling dispute events.
#[derive(Debug, Error)]
pub enum DisputeError {
    /// No internal transaction matches the provider's transaction id.
    ///
    /// This is an operational emergency, escalated by ticket rather than
    /// stored as a dispute.
    #[error("No internal transaction for provider transaction {provider_transaction_id} ({provider})")]
    UnknownTransaction {
        /// The provider that sent the event.
        provider: Provider,
        /// The provider transaction id we could not resolve.
        provider_transaction_id: String,
    },

    /// A lifecycle event arrived for a dispute we never saw created.
    #[error("No dispute on record for provider dispute {provider_dispute_id} ({provider})")]
    UnknownDispute {
        /// The provider that sent the event.
        provider: Provider,
        /// The provider dispute id we could not resolve.
        provider_dispute_id: String,
    },

    /// The dispute already reached a terminal state.
    #[error("Dispute {provider_dispute_id} is already resolved as {status:?}")]
    AlreadyResolved {
        /// The provider dispute id.
        provider_dispute_id: String,
        /// The terminal status it holds.
        status: DisputeStatus,
    },

    /// The provider reported an amount that does not fit the currency's
    /// minor unit.
    #[error("Disputed amount {amount} is not representable in {currency} minor units")]
    UnrepresentableAmount {
        /// The raw provider amount.
        amount: Decimal,
        /// The dispute currency.
        currency: Currency,
    },

    /// A freeze or unfreeze posting failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(String),
}
