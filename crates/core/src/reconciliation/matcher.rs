//! The pure reconciliation matcher.
//!
//! Matching is by key lookup on the shared provider transaction id, never
//! positional: given identical input sets the output discrepancy set is
//! identical regardless of input order.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tally_shared::config::ReconciliationConfig;
use tally_shared::types::{Currency, Provider};

use crate::provider::{normalize_internal, transaction_status, NormalizedStatus};

use super::types::{
    Discrepancy, DiscrepancyKind, InternalTransaction, ProviderTransaction, Severity,
};

/// Tolerance and severity thresholds for amount comparison.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Absolute tolerance in minor units (scaled per currency).
    pub tolerance_minor_units: i64,
    /// Major-unit difference above which a mismatch is HIGH severity.
    pub high_severity_major_units: Decimal,
    /// Major-unit difference above which a mismatch is MEDIUM severity.
    pub medium_severity_major_units: Decimal,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::from(&ReconciliationConfig::default())
    }
}

impl From<&ReconciliationConfig> for MatchConfig {
    fn from(config: &ReconciliationConfig) -> Self {
        Self {
            tolerance_minor_units: config.tolerance_minor_units,
            high_severity_major_units: config.high_severity_major_units,
            medium_severity_major_units: config.medium_severity_major_units,
        }
    }
}

impl MatchConfig {
    /// The amount tolerance in major units for the given currency.
    ///
    /// One minor unit of tolerance is 0.01 for USD but a whole unit for
    /// zero-decimal currencies.
    #[must_use]
    pub fn tolerance_major(&self, currency: Currency) -> Decimal {
        currency.to_major(self.tolerance_minor_units)
    }

    /// Severity for an amount difference, in major units.
    #[must_use]
    pub fn amount_severity(&self, difference_major: Decimal) -> Severity {
        let magnitude = difference_major.abs();
        if magnitude > self.high_severity_major_units {
            Severity::High
        } else if magnitude > self.medium_severity_major_units {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

/// Diffs the two sides and classifies every disagreement.
///
/// Output order is deterministic: extra transactions sorted by provider id,
/// then matched-pair mismatches sorted by provider id, then missing
/// transactions sorted by provider id.
#[must_use]
pub fn classify(
    provider: Provider,
    ours: &[InternalTransaction],
    theirs: &[ProviderTransaction],
    config: &MatchConfig,
) -> Vec<Discrepancy> {
    let ours_by_ref: HashMap<&str, &InternalTransaction> = ours
        .iter()
        .map(|txn| (txn.provider_ref.as_str(), txn))
        .collect();
    let theirs_by_id: HashMap<&str, &ProviderTransaction> =
        theirs.iter().map(|txn| (txn.id.as_str(), txn)).collect();

    let mut discrepancies = Vec::new();

    // Provider-side records with no internal counterpart: money movement
    // we have no record of is always high-severity.
    let mut extra_ids: Vec<&str> = theirs_by_id
        .keys()
        .filter(|id| !ours_by_ref.contains_key(*id))
        .copied()
        .collect();
    extra_ids.sort_unstable();

    for id in extra_ids {
        let record = theirs_by_id[id];
        discrepancies.push(Discrepancy {
            kind: DiscrepancyKind::ExtraTransaction,
            severity: Severity::High,
            provider_transaction_id: id.to_string(),
            our_amount: None,
            their_amount: Some(record.amount),
            difference: record.amount,
            detail: format!(
                "{provider} reports transaction {id} ({} {}) with no internal counterpart",
                record.amount, record.currency
            ),
        });
    }

    // Matched pairs: compare amounts within tolerance, then statuses.
    let mut matched_ids: Vec<&str> = theirs_by_id
        .keys()
        .filter(|id| ours_by_ref.contains_key(*id))
        .copied()
        .collect();
    matched_ids.sort_unstable();

    for id in matched_ids {
        let our = ours_by_ref[id];
        let their = theirs_by_id[id];

        compare_amounts(id, our, their, config, &mut discrepancies);
        compare_statuses(provider, id, our, their, &mut discrepancies);
    }

    // Internal records the provider never reported.
    let mut missing_refs: Vec<&str> = ours_by_ref
        .keys()
        .filter(|provider_ref| !theirs_by_id.contains_key(*provider_ref))
        .copied()
        .collect();
    missing_refs.sort_unstable();

    for provider_ref in missing_refs {
        let our = ours_by_ref[provider_ref];
        let our_amount = our.currency.to_major(our.amount_minor);
        discrepancies.push(Discrepancy {
            kind: DiscrepancyKind::MissingTransaction,
            severity: Severity::High,
            provider_transaction_id: provider_ref.to_string(),
            our_amount: Some(our_amount),
            their_amount: None,
            difference: -our_amount,
            detail: format!(
                "Journal transaction {} ({our_amount} {}) missing from the {provider} statement",
                our.transaction_id, our.currency
            ),
        });
    }

    discrepancies
}

fn compare_amounts(
    id: &str,
    our: &InternalTransaction,
    their: &ProviderTransaction,
    config: &MatchConfig,
    discrepancies: &mut Vec<Discrepancy>,
) {
    let our_amount = our.currency.to_major(our.amount_minor);

    if our.currency != their.currency {
        discrepancies.push(Discrepancy {
            kind: DiscrepancyKind::AmountMismatch,
            severity: Severity::High,
            provider_transaction_id: id.to_string(),
            our_amount: Some(our_amount),
            their_amount: Some(their.amount),
            difference: their.amount - our_amount,
            detail: format!(
                "Currency differs for {id}: ours {our_amount} {}, theirs {} {}",
                our.currency, their.amount, their.currency
            ),
        });
        return;
    }

    let difference = their.amount - our_amount;
    if difference.abs() > config.tolerance_major(our.currency) {
        discrepancies.push(Discrepancy {
            kind: DiscrepancyKind::AmountMismatch,
            severity: config.amount_severity(difference),
            provider_transaction_id: id.to_string(),
            our_amount: Some(our_amount),
            their_amount: Some(their.amount),
            difference,
            detail: format!(
                "Amount differs for {id}: ours {our_amount}, theirs {} ({} {difference})",
                their.amount, our.currency
            ),
        });
    }
}

fn compare_statuses(
    provider: Provider,
    id: &str,
    our: &InternalTransaction,
    their: &ProviderTransaction,
    discrepancies: &mut Vec<Discrepancy>,
) {
    let our_status = normalize_internal(our.status);
    let their_status = transaction_status(provider, &their.status);

    if our_status == their_status {
        return;
    }

    // A provider-side reversal of a transaction we consider settled needs
    // eyes on it; everything else is informational.
    let severity = if their_status.implies_reversal() && our_status == NormalizedStatus::Succeeded {
        Severity::Medium
    } else {
        Severity::Low
    };

    discrepancies.push(Discrepancy {
        kind: DiscrepancyKind::StatusMismatch,
        severity,
        provider_transaction_id: id.to_string(),
        our_amount: Some(our.currency.to_major(our.amount_minor)),
        their_amount: Some(their.amount),
        difference: Decimal::ZERO,
        detail: format!(
            "Status differs for {id}: ours {our_status:?}, theirs {:?} (raw {:?})",
            their_status, their.status
        ),
    });
}
