//! Table-driven provider vocabulary lookup.
//!
//! Adding a provider means adding tables here; nothing in the
//! reconciliation or dispute logic branches on the provider itself.
//! Unmapped values never fail; they degrade to the conservative default
//! (`Unknown` status, `Other` reason, `Unknown` outcome).

use serde::{Deserialize, Serialize};
use tally_shared::types::Provider;

use crate::dispute::{DisputeOutcome, DisputeReason, DisputeStatus};
use crate::ledger::TransactionStatus;

/// Provider-independent transaction status used for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizedStatus {
    /// Still in flight.
    Pending,
    /// Money moved.
    Succeeded,
    /// Money did not move.
    Failed,
    /// Money moved and was returned.
    Refunded,
    /// Money moved and was pulled back (chargeback).
    Reversed,
    /// Not in the provider's mapped vocabulary.
    Unknown,
}

impl NormalizedStatus {
    /// Returns true if this status means money flowed back out.
    #[must_use]
    pub const fn implies_reversal(self) -> bool {
        matches!(self, Self::Refunded | Self::Reversed)
    }
}

/// Normalizes our own transaction status for comparison against a
/// provider-reported one.
#[must_use]
pub const fn normalize_internal(status: TransactionStatus) -> NormalizedStatus {
    match status {
        TransactionStatus::Pending => NormalizedStatus::Pending,
        TransactionStatus::Completed => NormalizedStatus::Succeeded,
        TransactionStatus::Failed => NormalizedStatus::Failed,
    }
}

// ============================================================================
// Transaction status tables
// ============================================================================

const STRIPE_STATUS: &[(&str, NormalizedStatus)] = &[
    ("succeeded", NormalizedStatus::Succeeded),
    ("pending", NormalizedStatus::Pending),
    ("processing", NormalizedStatus::Pending),
    ("failed", NormalizedStatus::Failed),
    ("canceled", NormalizedStatus::Failed),
    ("refunded", NormalizedStatus::Refunded),
    ("disputed", NormalizedStatus::Reversed),
];

const ADYEN_STATUS: &[(&str, NormalizedStatus)] = &[
    ("authorised", NormalizedStatus::Succeeded),
    ("settled", NormalizedStatus::Succeeded),
    ("received", NormalizedStatus::Pending),
    ("refused", NormalizedStatus::Failed),
    ("cancelled", NormalizedStatus::Failed),
    ("error", NormalizedStatus::Failed),
    ("refunded", NormalizedStatus::Refunded),
    ("chargeback", NormalizedStatus::Reversed),
];

const GOPAY_STATUS: &[(&str, NormalizedStatus)] = &[
    ("settlement", NormalizedStatus::Succeeded),
    ("capture", NormalizedStatus::Succeeded),
    ("pending", NormalizedStatus::Pending),
    ("deny", NormalizedStatus::Failed),
    ("cancel", NormalizedStatus::Failed),
    ("expire", NormalizedStatus::Failed),
    ("refund", NormalizedStatus::Refunded),
    ("partial_refund", NormalizedStatus::Refunded),
];

const DANA_STATUS: &[(&str, NormalizedStatus)] = &[
    ("success", NormalizedStatus::Succeeded),
    ("init", NormalizedStatus::Pending),
    ("processing", NormalizedStatus::Pending),
    ("failed", NormalizedStatus::Failed),
    ("closed", NormalizedStatus::Failed),
    ("refunded", NormalizedStatus::Refunded),
];

/// Maps a provider transaction status string to the internal enum.
///
/// Case-insensitive; unmapped values return `Unknown`.
#[must_use]
pub fn transaction_status(provider: Provider, raw: &str) -> NormalizedStatus {
    let table = match provider {
        Provider::Stripe => STRIPE_STATUS,
        Provider::Adyen => ADYEN_STATUS,
        Provider::Gopay => GOPAY_STATUS,
        Provider::Dana => DANA_STATUS,
    };
    lookup(table, raw).unwrap_or(NormalizedStatus::Unknown)
}

// ============================================================================
// Dispute reason tables
// ============================================================================

const STRIPE_REASON: &[(&str, DisputeReason)] = &[
    ("fraudulent", DisputeReason::Fraudulent),
    ("product_not_received", DisputeReason::ProductNotReceived),
    ("unrecognized", DisputeReason::Unrecognized),
    ("credit_not_processed", DisputeReason::CreditNotProcessed),
];

const ADYEN_REASON: &[(&str, DisputeReason)] = &[
    ("fraud", DisputeReason::Fraudulent),
    ("merchandise_not_received", DisputeReason::ProductNotReceived),
    ("unrecognized_transaction", DisputeReason::Unrecognized),
    ("credit_not_processed", DisputeReason::CreditNotProcessed),
];

const GOPAY_REASON: &[(&str, DisputeReason)] = &[
    ("unauthorized_transaction", DisputeReason::Fraudulent),
    ("goods_not_delivered", DisputeReason::ProductNotReceived),
    ("transaction_not_recognized", DisputeReason::Unrecognized),
    ("refund_not_received", DisputeReason::CreditNotProcessed),
];

const DANA_REASON: &[(&str, DisputeReason)] = &[
    ("fraud", DisputeReason::Fraudulent),
    ("not_delivered", DisputeReason::ProductNotReceived),
    ("not_recognized", DisputeReason::Unrecognized),
    ("refund_missing", DisputeReason::CreditNotProcessed),
];

/// Maps a provider dispute reason string to the internal enum.
///
/// Case-insensitive; unmapped values return `Other`.
#[must_use]
pub fn dispute_reason(provider: Provider, raw: &str) -> DisputeReason {
    let table = match provider {
        Provider::Stripe => STRIPE_REASON,
        Provider::Adyen => ADYEN_REASON,
        Provider::Gopay => GOPAY_REASON,
        Provider::Dana => DANA_REASON,
    };
    lookup(table, raw).unwrap_or(DisputeReason::Other)
}

// ============================================================================
// Dispute status tables
// ============================================================================

const STRIPE_DISPUTE_STATUS: &[(&str, DisputeStatus)] = &[
    ("needs_response", DisputeStatus::UnderReview),
    ("warning_needs_response", DisputeStatus::UnderReview),
    ("under_review", DisputeStatus::UnderReview),
    ("won", DisputeStatus::Won),
    ("lost", DisputeStatus::Lost),
];

const ADYEN_DISPUTE_STATUS: &[(&str, DisputeStatus)] = &[
    ("undefended", DisputeStatus::UnderReview),
    ("pending", DisputeStatus::UnderReview),
    ("won", DisputeStatus::Won),
    ("lost", DisputeStatus::Lost),
    ("expired", DisputeStatus::Lost),
];

const GOPAY_DISPUTE_STATUS: &[(&str, DisputeStatus)] = &[
    ("open", DisputeStatus::UnderReview),
    ("waiting_merchant", DisputeStatus::UnderReview),
    ("merchant_win", DisputeStatus::Won),
    ("merchant_lose", DisputeStatus::Lost),
];

const DANA_DISPUTE_STATUS: &[(&str, DisputeStatus)] = &[
    ("open", DisputeStatus::UnderReview),
    ("in_review", DisputeStatus::UnderReview),
    ("seller_win", DisputeStatus::Won),
    ("seller_lose", DisputeStatus::Lost),
];

/// Maps a provider dispute status string to the internal state machine.
///
/// Case-insensitive; unmapped values default to `UnderReview` rather than
/// failing.
#[must_use]
pub fn dispute_status(provider: Provider, raw: &str) -> DisputeStatus {
    let table = match provider {
        Provider::Stripe => STRIPE_DISPUTE_STATUS,
        Provider::Adyen => ADYEN_DISPUTE_STATUS,
        Provider::Gopay => GOPAY_DISPUTE_STATUS,
        Provider::Dana => DANA_DISPUTE_STATUS,
    };
    lookup(table, raw).unwrap_or(DisputeStatus::UnderReview)
}

// ============================================================================
// Dispute outcome tables
// ============================================================================

const STRIPE_OUTCOME: &[(&str, DisputeOutcome)] = &[
    ("won", DisputeOutcome::Won),
    ("warning_closed", DisputeOutcome::Won),
    ("lost", DisputeOutcome::Lost),
    ("charge_refunded", DisputeOutcome::Lost),
];

const ADYEN_OUTCOME: &[(&str, DisputeOutcome)] = &[
    ("won", DisputeOutcome::Won),
    ("defended", DisputeOutcome::Won),
    ("lost", DisputeOutcome::Lost),
    ("accepted", DisputeOutcome::Lost),
];

const GOPAY_OUTCOME: &[(&str, DisputeOutcome)] = &[
    ("merchant_win", DisputeOutcome::Won),
    ("merchant_lose", DisputeOutcome::Lost),
];

const DANA_OUTCOME: &[(&str, DisputeOutcome)] = &[
    ("seller_win", DisputeOutcome::Won),
    ("seller_lose", DisputeOutcome::Lost),
];

/// Maps a provider dispute outcome string to the internal enum.
///
/// Case-insensitive; unmapped values return `Unknown`, which closes the
/// dispute without touching the ledger.
#[must_use]
pub fn dispute_outcome(provider: Provider, raw: &str) -> DisputeOutcome {
    let table = match provider {
        Provider::Stripe => STRIPE_OUTCOME,
        Provider::Adyen => ADYEN_OUTCOME,
        Provider::Gopay => GOPAY_OUTCOME,
        Provider::Dana => DANA_OUTCOME,
    };
    lookup(table, raw).unwrap_or(DisputeOutcome::Unknown)
}

/// Case-insensitive table lookup.
fn lookup<T: Copy>(table: &[(&str, T)], raw: &str) -> Option<T> {
    table
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(raw))
        .map(|(_, value)| *value)
}
