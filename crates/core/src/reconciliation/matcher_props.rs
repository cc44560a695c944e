//! Property-based tests for the reconciliation matcher.
//!
//! The matcher is key-based: its output must not depend on input order,
//! and every record must be classified exactly once per dimension.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{Currency, Provider, TransactionId};

use crate::ledger::TransactionStatus;

use super::matcher::{classify, MatchConfig};
use super::types::{DiscrepancyKind, InternalTransaction, ProviderTransaction};

/// Strategy for positive cent amounts.
fn amount_minor() -> impl Strategy<Value = i64> {
    1i64..1_000_000i64
}

/// Strategy for a set of (id, amount) pairs with unique ids.
fn record_set() -> impl Strategy<Value = Vec<(String, i64)>> {
    prop::collection::btree_map(0u32..1_000u32, amount_minor(), 0..12).prop_map(|map| {
        map.into_iter()
            .map(|(id, amount)| (format!("txn-{id}"), amount))
            .collect()
    })
}

fn internal(provider_ref: &str, amount_minor: i64) -> InternalTransaction {
    InternalTransaction {
        transaction_id: TransactionId::new(),
        provider_ref: provider_ref.to_string(),
        amount_minor,
        currency: Currency::Usd,
        status: TransactionStatus::Completed,
    }
}

fn reported(id: &str, amount_minor: i64) -> ProviderTransaction {
    ProviderTransaction {
        id: id.to_string(),
        amount: Currency::Usd.to_major(amount_minor),
        currency: Currency::Usd,
        status: "succeeded".to_string(),
        timestamp: Utc::now(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* pair of input sets, classifying shuffled inputs SHALL
    /// produce the same discrepancy list as the original order.
    #[test]
    fn prop_order_independent(
        records in record_set(),
        seed in any::<u64>(),
    ) {
        let ours: Vec<_> = records.iter().map(|(id, amount)| internal(id, *amount)).collect();
        // Give the provider side every other record so both extra and
        // missing classifications occur.
        let theirs: Vec<_> = records
            .iter()
            .step_by(2)
            .map(|(id, amount)| reported(id, *amount))
            .collect();

        let baseline = classify(Provider::Stripe, &ours, &theirs, &MatchConfig::default());

        // Deterministic shuffle derived from the seed.
        let mut ours_shuffled = ours;
        let mut theirs_shuffled = theirs;
        let len = ours_shuffled.len();
        if len > 1 {
            for i in 0..len {
                #[allow(clippy::cast_possible_truncation)]
                let j = ((seed.wrapping_mul(i as u64 + 1)) % len as u64) as usize;
                ours_shuffled.swap(i, j);
            }
        }
        let len = theirs_shuffled.len();
        if len > 1 {
            for i in 0..len {
                #[allow(clippy::cast_possible_truncation)]
                let j = ((seed.wrapping_mul(i as u64 + 7)) % len as u64) as usize;
                theirs_shuffled.swap(i, j);
            }
        }

        let shuffled = classify(
            Provider::Stripe,
            &ours_shuffled,
            &theirs_shuffled,
            &MatchConfig::default(),
        );

        prop_assert_eq!(baseline, shuffled);
    }

    /// *For any* agreeing sides, classification SHALL find nothing.
    #[test]
    fn prop_identical_sides_agree(records in record_set()) {
        let ours: Vec<_> = records.iter().map(|(id, amount)| internal(id, *amount)).collect();
        let theirs: Vec<_> = records.iter().map(|(id, amount)| reported(id, *amount)).collect();

        let found = classify(Provider::Stripe, &ours, &theirs, &MatchConfig::default());
        prop_assert!(found.is_empty());
    }

    /// *For any* provider-side superset, exactly the surplus records SHALL
    /// be flagged as extra transactions and nothing else.
    #[test]
    fn prop_superset_yields_exactly_the_extras(
        records in record_set(),
        extras in record_set(),
    ) {
        let ours: Vec<_> = records.iter().map(|(id, amount)| internal(id, *amount)).collect();
        let mut theirs: Vec<_> =
            records.iter().map(|(id, amount)| reported(id, *amount)).collect();

        let known: std::collections::HashSet<&str> =
            records.iter().map(|(id, _)| id.as_str()).collect();
        let mut expected: Vec<String> = Vec::new();
        for (id, amount) in &extras {
            let extra_id = format!("extra-{id}");
            prop_assume!(!known.contains(extra_id.as_str()));
            theirs.push(reported(&extra_id, *amount));
            expected.push(extra_id);
        }
        expected.sort_unstable();

        let found = classify(Provider::Stripe, &ours, &theirs, &MatchConfig::default());

        let flagged: Vec<String> = found
            .iter()
            .filter(|d| d.kind == DiscrepancyKind::ExtraTransaction)
            .map(|d| d.provider_transaction_id.clone())
            .collect();

        prop_assert_eq!(flagged, expected);
        prop_assert!(found
            .iter()
            .all(|d| d.kind == DiscrepancyKind::ExtraTransaction));
    }

    /// *For any* amount difference, severity SHALL follow the documented
    /// 100/10 major-unit cutoffs.
    #[test]
    fn prop_severity_monotone_in_difference(
        base in 1i64..100_000i64,
        difference_minor in 2i64..100_000_00i64,
    ) {
        let ours = vec![internal("A", base)];
        let theirs = vec![reported("A", base + difference_minor)];
        let config = MatchConfig::default();

        let found = classify(Provider::Stripe, &ours, &theirs, &config);
        prop_assert_eq!(found.len(), 1);

        let difference_major = Currency::Usd.to_major(difference_minor);
        let expected = config.amount_severity(difference_major);
        prop_assert_eq!(found[0].severity, expected);
        prop_assert_eq!(found[0].difference, difference_major);
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    #[test]
    fn test_tolerance_scales_with_currency() {
        let config = MatchConfig::default();
        assert_eq!(config.tolerance_major(Currency::Usd), Decimal::new(1, 2));
        assert_eq!(config.tolerance_major(Currency::Jpy), Decimal::ONE);
    }
}
