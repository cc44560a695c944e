//! Dispute lifecycle scenarios: freeze on creation, release on win,
//! permanent reserve debit on loss, escalation on unknown transactions.

mod support;

use chrono::Utc;
use rust_decimal_macros::dec;

use tally_core::dispute::{DisputeEvent, DisputeEventKind, DisputeStatus};
use tally_core::ledger::{
    AccountCategory, OwnerType, PostingLeg, PostingRequest, TransactionType,
};
use tally_services::collaborators::TicketKind;
use tally_shared::types::{Currency, Provider};

use support::Harness;

/// Funds the platform's available balance with a 1000.00 USD capture so a
/// freeze has something to hold.
fn fund_available(harness: &Harness, reference: &str) {
    let available = harness
        .services
        .registry
        .platform_account(AccountCategory::AvailableBalance, Currency::Usd)
        .unwrap();
    let payable = harness.services.registry.get_or_create(
        "provider:stripe",
        OwnerType::Provider,
        AccountCategory::Payable,
        Currency::Usd,
    );

    harness
        .services
        .journal
        .post(PostingRequest {
            transaction_type: TransactionType::BookingPayment,
            reference: reference.to_string(),
            provider: Some(Provider::Stripe),
            idempotency_key: None,
            currency: Currency::Usd,
            legs: vec![
                PostingLeg::debit(available.id, 100_000, "capture"),
                PostingLeg::credit(payable.id, 100_000, "capture"),
            ],
        })
        .unwrap();
}

fn created_event(provider_dispute_id: &str, provider_transaction_id: &str) -> DisputeEvent {
    DisputeEvent {
        provider: Provider::Stripe,
        provider_dispute_id: provider_dispute_id.to_string(),
        provider_transaction_id: provider_transaction_id.to_string(),
        kind: DisputeEventKind::Created {
            reason: "fraudulent".to_string(),
            amount: dec!(200.00),
            currency: Currency::Usd,
            evidence_due_by: None,
        },
        occurred_at: Utc::now(),
    }
}

fn closed_event(provider_dispute_id: &str, outcome: &str) -> DisputeEvent {
    DisputeEvent {
        provider: Provider::Stripe,
        provider_dispute_id: provider_dispute_id.to_string(),
        provider_transaction_id: String::new(),
        kind: DisputeEventKind::Closed {
            outcome: outcome.to_string(),
        },
        occurred_at: Utc::now(),
    }
}

fn balances(harness: &Harness) -> (i64, i64) {
    let registry = &harness.services.registry;
    let available = registry
        .platform_account(AccountCategory::AvailableBalance, Currency::Usd)
        .unwrap();
    let reserve = registry
        .platform_account(AccountCategory::DisputeReserve, Currency::Usd)
        .unwrap();
    (available.balance_minor, reserve.balance_minor)
}

#[tokio::test]
async fn test_freeze_then_win_restores_balances_exactly() {
    let harness = Harness::new();
    fund_available(&harness, "ch_1");
    let before = balances(&harness);
    assert_eq!(before, (100_000, 0));

    // Freeze 200.00
    let dispute = harness
        .services
        .disputes
        .handle_event(created_event("dp_1", "ch_1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(dispute.status, DisputeStatus::UnderReview);
    assert_eq!(balances(&harness), (80_000, 20_000));

    // Winning releases the hold; balances return to pre-freeze values.
    let resolved = harness
        .services
        .disputes
        .handle_event(closed_event("dp_1", "won"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.status, DisputeStatus::Won);
    assert!(resolved.resolved_at.is_some());
    assert_eq!(balances(&harness), before);

    // The ledger stays verifiable through the whole round trip.
    assert!(harness
        .services
        .verifier
        .perform_verification()
        .await
        .is_all_valid());
}

#[tokio::test]
async fn test_losing_keeps_funds_in_reserve() {
    let harness = Harness::new();
    fund_available(&harness, "ch_1");

    harness
        .services
        .disputes
        .handle_event(created_event("dp_1", "ch_1"))
        .await
        .unwrap();
    let resolved = harness
        .services
        .disputes
        .handle_event(closed_event("dp_1", "lost"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(resolved.status, DisputeStatus::Lost);
    // No unfreeze: the reserve keeps the 200.00 permanently.
    assert_eq!(balances(&harness), (80_000, 20_000));
    assert!(harness
        .services
        .verifier
        .perform_verification()
        .await
        .is_all_valid());
}

#[tokio::test]
async fn test_duplicate_webhooks_are_no_ops() {
    let harness = Harness::new();
    fund_available(&harness, "ch_1");

    harness
        .services
        .disputes
        .handle_event(created_event("dp_1", "ch_1"))
        .await
        .unwrap();
    // Redelivered created event: same dispute, no second freeze.
    harness
        .services
        .disputes
        .handle_event(created_event("dp_1", "ch_1"))
        .await
        .unwrap();
    assert_eq!(balances(&harness), (80_000, 20_000));

    harness
        .services
        .disputes
        .handle_event(closed_event("dp_1", "won"))
        .await
        .unwrap();
    // Redelivered close event: no second unfreeze.
    let second = harness
        .services
        .disputes
        .handle_event(closed_event("dp_1", "won"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second.status, DisputeStatus::Won);
    assert_eq!(balances(&harness), (100_000, 0));
}

#[tokio::test]
async fn test_status_updates_keep_review_open_until_terminal() {
    let harness = Harness::new();
    fund_available(&harness, "ch_1");

    harness
        .services
        .disputes
        .handle_event(created_event("dp_1", "ch_1"))
        .await
        .unwrap();

    // An evidence-phase update (and an unmapped status) keep the dispute
    // open and the funds frozen.
    for status in ["needs_response", "brand_new_status"] {
        let mut event = closed_event("dp_1", "");
        event.kind = DisputeEventKind::Updated {
            status: status.to_string(),
        };
        let dispute = harness
            .services
            .disputes
            .handle_event(event)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(dispute.status, DisputeStatus::UnderReview);
    }
    assert_eq!(balances(&harness), (80_000, 20_000));

    // A terminal status update resolves without waiting for a close event.
    let mut event = closed_event("dp_1", "");
    event.kind = DisputeEventKind::Updated {
        status: "won".to_string(),
    };
    let resolved = harness
        .services
        .disputes
        .handle_event(event)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.status, DisputeStatus::Won);
    assert_eq!(balances(&harness), (100_000, 0));
}

#[tokio::test]
async fn test_unknown_transaction_escalates_without_creating_dispute() {
    let harness = Harness::new();
    fund_available(&harness, "ch_1");

    let result = harness
        .services
        .disputes
        .handle_event(created_event("dp_9", "ch_never_seen"))
        .await
        .unwrap();

    assert!(result.is_none());
    // No freeze happened.
    assert_eq!(balances(&harness), (100_000, 0));
    // But the emergency was escalated: one alert, one high-priority ticket.
    assert_eq!(harness.alerts.count(), 1);
    assert_eq!(
        harness.tickets.kinds(),
        vec![TicketKind::UnknownDisputeTransaction]
    );
}

#[tokio::test]
async fn test_unmapped_outcome_closes_without_ledger_mutation() {
    let harness = Harness::new();
    fund_available(&harness, "ch_1");

    harness
        .services
        .disputes
        .handle_event(created_event("dp_1", "ch_1"))
        .await
        .unwrap();
    let resolved = harness
        .services
        .disputes
        .handle_event(closed_event("dp_1", "some_new_status"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(resolved.status, DisputeStatus::Closed);
    // Frozen funds untouched; manual follow-up ticket filed.
    assert_eq!(balances(&harness), (80_000, 20_000));
    assert!(harness
        .tickets
        .kinds()
        .contains(&TicketKind::DisputeFollowUp));
}

#[tokio::test]
async fn test_high_value_dispute_always_files_a_ticket() {
    let harness = Harness::new();
    fund_available(&harness, "ch_1");

    // 600.00 is above the default 500 major-unit threshold.
    let mut event = created_event("dp_big", "ch_1");
    event.kind = DisputeEventKind::Created {
        reason: "fraudulent".to_string(),
        amount: dec!(600.00),
        currency: Currency::Usd,
        evidence_due_by: None,
    };

    harness.services.disputes.handle_event(event).await.unwrap();
    assert_eq!(harness.tickets.kinds(), vec![TicketKind::HighValueDispute]);
}
