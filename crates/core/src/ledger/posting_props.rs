//! Property-based tests for posting validation.
//!
//! The core double-entry invariant: any sequence of accepted postings keeps
//! the global debit and credit sums equal, and validation is the gate that
//! makes this hold.

use proptest::prelude::*;
use tally_shared::types::{AccountId, Currency, Provider};

use super::entry::EntryDirection;
use super::error::LedgerError;
use super::posting::{validate_posting, PostingLeg, PostingRequest};
use super::transaction::TransactionType;

/// Strategy for positive minor-unit amounts (1 to 10,000.00 in cents).
fn positive_amount() -> impl Strategy<Value = i64> {
    1i64..1_000_000i64
}

/// Strategy for a balanced leg set: each amount becomes one debit/credit
/// pair on fresh accounts.
fn balanced_legs() -> impl Strategy<Value = Vec<PostingLeg>> {
    prop::collection::vec(positive_amount(), 1..8).prop_map(|amounts| {
        amounts
            .into_iter()
            .flat_map(|amount| {
                vec![
                    PostingLeg::debit(AccountId::new(), amount, "leg"),
                    PostingLeg::credit(AccountId::new(), amount, "leg"),
                ]
            })
            .collect()
    })
}

fn make_request(legs: Vec<PostingLeg>) -> PostingRequest {
    PostingRequest {
        transaction_type: TransactionType::BookingPayment,
        reference: "ref".to_string(),
        provider: Some(Provider::Stripe),
        idempotency_key: None,
        currency: Currency::Usd,
        legs,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* balanced leg set, validation SHALL succeed and report
    /// equal debit and credit totals.
    #[test]
    fn prop_balanced_posting_accepted(legs in balanced_legs()) {
        let request = make_request(legs);
        let totals = validate_posting(&request);

        prop_assert!(totals.is_ok(), "Balanced posting should be accepted");
        let totals = totals.unwrap();
        prop_assert_eq!(totals.debit_minor, totals.credit_minor);
    }

    /// *For any* sequence of accepted postings, the running global debit
    /// and credit sums SHALL stay equal.
    #[test]
    fn prop_global_balance_preserved(
        leg_sets in prop::collection::vec(balanced_legs(), 1..6),
    ) {
        let mut global_debits = 0i64;
        let mut global_credits = 0i64;

        for legs in leg_sets {
            let request = make_request(legs);
            let totals = validate_posting(&request).unwrap();
            global_debits += totals.debit_minor;
            global_credits += totals.credit_minor;

            prop_assert_eq!(
                global_debits, global_credits,
                "Global debits and credits should stay equal after every posting"
            );
        }
    }

    /// *For any* posting where one leg's amount was perturbed, validation
    /// SHALL fail with UnbalancedPosting.
    #[test]
    fn prop_perturbed_posting_rejected(
        legs in balanced_legs(),
        delta in 1i64..1_000i64,
    ) {
        let mut legs = legs;
        legs[0].amount_minor += delta;
        let request = make_request(legs);

        prop_assert!(
            matches!(
                validate_posting(&request),
                Err(LedgerError::UnbalancedPosting { .. })
            ),
            "Perturbed posting should be rejected as unbalanced"
        );
    }

    /// *For any* all-debit leg set, validation SHALL fail with
    /// SingleSidedPosting.
    #[test]
    fn prop_single_sided_rejected(amounts in prop::collection::vec(positive_amount(), 1..6)) {
        let legs = amounts
            .into_iter()
            .map(|amount| PostingLeg {
                account_id: AccountId::new(),
                direction: EntryDirection::Debit,
                amount_minor: amount,
                description: "leg".to_string(),
            })
            .collect();
        let request = make_request(legs);

        prop_assert!(matches!(
            validate_posting(&request),
            Err(LedgerError::SingleSidedPosting)
        ));
    }
}
