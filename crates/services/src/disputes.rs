//! The dispute coordinator: webhook events in, freezes and state
//! transitions out.
//!
//! Freeze and unfreeze postings go through the journal under the natural
//! keys `dispute:<provider_dispute_id>:freeze` / `:unfreeze`, so
//! at-least-once webhook delivery is idempotent without any deduplication
//! table.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use tally_core::dispute::{
    Dispute, DisputeError, DisputeEvent, DisputeEventKind, DisputeOutcome, DisputeStatus,
};
use tally_core::ledger::{AccountCategory, PostingLeg, PostingRequest, TransactionType};
use tally_core::provider::{dispute_outcome, dispute_reason, dispute_status};
use tally_shared::config::DisputeConfig;
use tally_shared::types::{Currency, DisputeId, Provider};
use tally_store::{DisputeStore, LedgerStore};

use crate::collaborators::{
    AlertCategory, AlertSink, Ticketing, TicketKind, TicketPriority,
};
use crate::journal::TransactionJournal;
use crate::registry::AccountRegistry;

/// Handles provider dispute webhooks and drives the freeze lifecycle.
pub struct DisputeCoordinator {
    ledger: Arc<LedgerStore>,
    disputes: Arc<DisputeStore>,
    journal: Arc<TransactionJournal>,
    registry: Arc<AccountRegistry>,
    alerts: Arc<dyn AlertSink>,
    tickets: Arc<dyn Ticketing>,
    config: DisputeConfig,
}

impl DisputeCoordinator {
    /// Creates a coordinator with its collaborators.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ledger: Arc<LedgerStore>,
        disputes: Arc<DisputeStore>,
        journal: Arc<TransactionJournal>,
        registry: Arc<AccountRegistry>,
        alerts: Arc<dyn AlertSink>,
        tickets: Arc<dyn Ticketing>,
        config: &DisputeConfig,
    ) -> Self {
        Self {
            ledger,
            disputes,
            journal,
            registry,
            alerts,
            tickets,
            config: config.clone(),
        }
    }

    /// Handles one provider dispute event.
    ///
    /// Returns the affected dispute, or `None` when the event was accepted
    /// but escalated instead of stored (a dispute for a transaction we
    /// have no record of). Duplicate deliveries of any event are no-ops.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed amounts, lifecycle events for
    /// unknown disputes, and freeze/unfreeze posting failures.
    pub async fn handle_event(
        &self,
        event: DisputeEvent,
    ) -> Result<Option<Dispute>, DisputeError> {
        match &event.kind {
            DisputeEventKind::Created {
                reason,
                amount,
                currency,
                evidence_due_by,
            } => {
                self.handle_created(
                    &event,
                    reason,
                    *amount,
                    *currency,
                    *evidence_due_by,
                )
                .await
            }
            DisputeEventKind::Updated { status } => self.handle_updated(&event, status).await,
            DisputeEventKind::Closed { outcome } => self.handle_closed(&event, outcome).await,
        }
    }

    async fn handle_created(
        &self,
        event: &DisputeEvent,
        raw_reason: &str,
        amount: rust_decimal::Decimal,
        currency: Currency,
        evidence_due_by: Option<chrono::DateTime<Utc>>,
    ) -> Result<Option<Dispute>, DisputeError> {
        // A dispute with no matching internal transaction is an
        // operational emergency, not a data-modeling gap.
        let Some(transaction) = self
            .ledger
            .find_by_provider_reference(event.provider, &event.provider_transaction_id)
        else {
            self.escalate_unknown_transaction(event).await;
            return Ok(None);
        };

        let Some(disputed_amount_minor) = currency.to_minor(amount) else {
            return Err(DisputeError::UnrepresentableAmount { amount, currency });
        };

        let dispute = self.disputes.insert_or_get(Dispute {
            id: DisputeId::new(),
            provider: event.provider,
            provider_dispute_id: event.provider_dispute_id.clone(),
            transaction_id: transaction.id,
            status: tally_core::dispute::DisputeStatus::UnderReview,
            reason: dispute_reason(event.provider, raw_reason),
            disputed_amount_minor,
            currency,
            evidence_due_by,
            opened_at: event.occurred_at,
            resolved_at: None,
        });

        // Freeze the disputed amount: move it from available balance into
        // the dispute reserve. Idempotent under redelivery via the key.
        self.post_freeze_legs(
            event.provider,
            &event.provider_dispute_id,
            disputed_amount_minor,
            currency,
            TransactionType::DisputeFreeze,
        )?;

        info!(
            provider_dispute_id = %dispute.provider_dispute_id,
            amount_minor = disputed_amount_minor,
            "dispute opened, funds frozen"
        );

        if self.is_high_value(&dispute) {
            self.file_ticket_best_effort(
                TicketKind::HighValueDispute,
                &format!(
                    "High-value dispute {} ({}) opened against transaction {}",
                    dispute.provider_dispute_id,
                    dispute.disputed_amount(),
                    transaction.id
                ),
                TicketPriority::High,
            )
            .await;
        }

        Ok(Some(dispute))
    }

    async fn handle_updated(
        &self,
        event: &DisputeEvent,
        raw_status: &str,
    ) -> Result<Option<Dispute>, DisputeError> {
        let dispute = self.lookup_known_dispute(event).await?;

        // Redelivered or out-of-order events after resolution are no-ops.
        if dispute.status.is_resolved() {
            return Ok(Some(dispute));
        }

        // A status update can carry the resolution before (or instead of)
        // the close event; unmapped statuses mean the review continues.
        match dispute_status(event.provider, raw_status) {
            DisputeStatus::UnderReview => Ok(Some(dispute)),
            DisputeStatus::Won => {
                self.resolve_with_outcome(dispute, DisputeOutcome::Won, raw_status, event)
                    .await
            }
            DisputeStatus::Lost => {
                self.resolve_with_outcome(dispute, DisputeOutcome::Lost, raw_status, event)
                    .await
            }
            DisputeStatus::Closed => {
                self.resolve_with_outcome(dispute, DisputeOutcome::Unknown, raw_status, event)
                    .await
            }
        }
    }

    async fn handle_closed(
        &self,
        event: &DisputeEvent,
        raw_outcome: &str,
    ) -> Result<Option<Dispute>, DisputeError> {
        let dispute = self.lookup_known_dispute(event).await?;

        // Redelivered close events are no-ops.
        if dispute.status.is_resolved() {
            return Ok(Some(dispute));
        }

        let outcome = dispute_outcome(event.provider, raw_outcome);
        self.resolve_with_outcome(dispute, outcome, raw_outcome, event)
            .await
    }

    async fn lookup_known_dispute(
        &self,
        event: &DisputeEvent,
    ) -> Result<Dispute, DisputeError> {
        match self
            .disputes
            .find_by_provider_id(event.provider, &event.provider_dispute_id)
        {
            Some(dispute) => Ok(dispute),
            None => {
                self.alerts
                    .alert(
                        AlertCategory::Dispute,
                        &format!(
                            "Lifecycle event for unknown dispute {} ({})",
                            event.provider_dispute_id, event.provider
                        ),
                        "No dispute on record; the created event may not have arrived",
                    )
                    .await;
                Err(DisputeError::UnknownDispute {
                    provider: event.provider,
                    provider_dispute_id: event.provider_dispute_id.clone(),
                })
            }
        }
    }

    async fn resolve_with_outcome(
        &self,
        mut dispute: Dispute,
        outcome: DisputeOutcome,
        raw: &str,
        event: &DisputeEvent,
    ) -> Result<Option<Dispute>, DisputeError> {
        match outcome {
            DisputeOutcome::Won => {
                // Release the frozen funds back to the available balance.
                self.post_freeze_legs(
                    event.provider,
                    &event.provider_dispute_id,
                    dispute.disputed_amount_minor,
                    dispute.currency,
                    TransactionType::DisputeUnfreeze,
                )?;
            }
            DisputeOutcome::Lost => {
                // Funds stay in the dispute reserve; the reserve balance is
                // the loss record.
            }
            DisputeOutcome::Unknown => {
                warn!(
                    provider_dispute_id = %dispute.provider_dispute_id,
                    raw,
                    "unmapped dispute outcome, closing for manual follow-up"
                );
                self.file_ticket_best_effort(
                    TicketKind::DisputeFollowUp,
                    &format!(
                        "Dispute {} closed with unmapped outcome {raw:?}; frozen funds untouched",
                        dispute.provider_dispute_id
                    ),
                    TicketPriority::Normal,
                )
                .await;
            }
        }

        dispute.resolve(outcome, event.occurred_at)?;
        self.disputes.update(dispute.clone());

        info!(
            provider_dispute_id = %dispute.provider_dispute_id,
            status = ?dispute.status,
            "dispute resolved"
        );

        Ok(Some(dispute))
    }

    /// Posts the freeze or unfreeze pair through the journal.
    ///
    /// Freeze debits the dispute reserve and credits the available balance
    /// (both asset-like, so the reserve grows and the available balance
    /// shrinks by the disputed amount); unfreeze reverses the legs.
    fn post_freeze_legs(
        &self,
        provider: Provider,
        provider_dispute_id: &str,
        amount_minor: i64,
        currency: Currency,
        transaction_type: TransactionType,
    ) -> Result<(), DisputeError> {
        let available =
            self.registry
                .platform_account(AccountCategory::AvailableBalance, currency)?;
        let reserve = self
            .registry
            .platform_account(AccountCategory::DisputeReserve, currency)?;

        let (legs, key_suffix) = match transaction_type {
            TransactionType::DisputeUnfreeze => (
                vec![
                    PostingLeg::debit(available.id, amount_minor, "dispute unfreeze"),
                    PostingLeg::credit(reserve.id, amount_minor, "dispute unfreeze"),
                ],
                "unfreeze",
            ),
            _ => (
                vec![
                    PostingLeg::debit(reserve.id, amount_minor, "dispute freeze"),
                    PostingLeg::credit(available.id, amount_minor, "dispute freeze"),
                ],
                "freeze",
            ),
        };

        self.journal.post(PostingRequest {
            transaction_type,
            reference: provider_dispute_id.to_string(),
            provider: Some(provider),
            idempotency_key: Some(format!("dispute:{provider_dispute_id}:{key_suffix}")),
            currency,
            legs,
        })?;
        Ok(())
    }

    fn is_high_value(&self, dispute: &Dispute) -> bool {
        dispute.disputed_amount().to_major() > self.config.high_value_major_units
    }

    async fn escalate_unknown_transaction(&self, event: &DisputeEvent) {
        let summary = format!(
            "Dispute {} references unknown transaction {} ({})",
            event.provider_dispute_id, event.provider_transaction_id, event.provider
        );
        warn!(%summary, "dispute for unknown transaction");
        self.alerts
            .alert(AlertCategory::Dispute, &summary, "No dispute was created; investigate the missing transaction")
            .await;
        self.file_ticket_best_effort(
            TicketKind::UnknownDisputeTransaction,
            &summary,
            TicketPriority::High,
        )
        .await;
    }

    async fn file_ticket_best_effort(
        &self,
        kind: TicketKind,
        description: &str,
        priority: TicketPriority,
    ) {
        if let Err(error) = self.tickets.file_ticket(kind, description, priority).await {
            warn!(%error, "failed to file dispute ticket");
        }
    }
}
