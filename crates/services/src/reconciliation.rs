//! The reconciliation engine: daily per-provider jobs and the manual
//! range variant.
//!
//! A feed failure degrades to an empty statement and a Failed job; it
//! never aborts other providers' jobs. Alert and ticket delivery is
//! fire-and-forget: a notification failure cannot fail the job.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use tally_core::ledger::Transaction;
use tally_core::reconciliation::{
    classify, Discrepancy, InternalTransaction, JobStatus, MatchConfig, ReconciliationJob,
    Severity,
};
use tally_shared::config::ReconciliationConfig;
use tally_shared::types::{Provider, ReconciliationJobId};
use tally_store::{LedgerStore, ReconciliationStore};

use crate::collaborators::{
    AlertCategory, AlertSink, ProviderFeed, Ticketing, TicketKind, TicketPriority,
};

/// Diffs the transaction journal against provider statements.
pub struct ReconciliationEngine {
    ledger: Arc<LedgerStore>,
    store: Arc<ReconciliationStore>,
    feed: Arc<dyn ProviderFeed>,
    alerts: Arc<dyn AlertSink>,
    tickets: Arc<dyn Ticketing>,
    config: MatchConfig,
}

impl ReconciliationEngine {
    /// Creates an engine with its collaborators.
    #[must_use]
    pub fn new(
        ledger: Arc<LedgerStore>,
        store: Arc<ReconciliationStore>,
        feed: Arc<dyn ProviderFeed>,
        alerts: Arc<dyn AlertSink>,
        tickets: Arc<dyn Ticketing>,
        config: &ReconciliationConfig,
    ) -> Self {
        Self {
            ledger,
            store,
            feed,
            alerts,
            tickets,
            config: MatchConfig::from(config),
        }
    }

    /// Reconciles one provider for one day: the daily job.
    pub async fn reconcile(&self, provider: Provider, date: NaiveDate) -> ReconciliationJob {
        let end = date.succ_opt().unwrap_or(date);
        self.reconcile_range(provider, date, end).await
    }

    /// Reconciles one provider over an arbitrary `[start, end)` window:
    /// the manual variant for ad hoc investigation.
    pub async fn reconcile_range(
        &self,
        provider: Provider,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ReconciliationJob {
        let window_start = day_start(start);
        let window_end = day_start(end);

        // Internal side, keyed by the provider's transaction id.
        let internal =
            self.ledger
                .transactions_for_provider(provider, window_start, window_end);
        let ours: Vec<InternalTransaction> = internal.iter().map(to_internal_record).collect();
        let ours_total: Decimal = ours
            .iter()
            .map(|record| record.currency.to_major(record.amount_minor))
            .sum();

        let mut job = ReconciliationJob {
            id: ReconciliationJobId::new(),
            provider,
            period_start: start,
            period_end: end,
            status: JobStatus::Processing,
            ours_count: ours.len(),
            theirs_count: 0,
            ours_total,
            theirs_total: Decimal::ZERO,
            started_at: Utc::now(),
            finished_at: None,
        };
        self.store.upsert_job(job.clone());

        // Provider side. A feed failure fails this job only.
        let theirs = match self
            .feed
            .list_transactions(provider, window_start, window_end)
            .await
        {
            Ok(theirs) => theirs,
            Err(error) => {
                warn!(%provider, %error, "provider feed failed, marking job failed");
                job.status = JobStatus::Failed;
                job.finished_at = Some(Utc::now());
                self.store.upsert_job(job.clone());
                self.alerts
                    .alert(
                        AlertCategory::Reconciliation,
                        &format!("Reconciliation feed failure for {provider} on {start}"),
                        &error.to_string(),
                    )
                    .await;
                return job;
            }
        };

        job.theirs_count = theirs.len();
        job.theirs_total = theirs.iter().map(|record| record.amount).sum();

        // Classification is pure and key-based: identical inputs give an
        // identical discrepancy set regardless of call order.
        let findings = classify(provider, &ours, &theirs, &self.config);

        job.status = if findings.is_empty() {
            JobStatus::Completed
        } else {
            JobStatus::CompletedWithDiscrepancies
        };
        job.finished_at = Some(Utc::now());
        self.store.upsert_job(job.clone());

        info!(
            %provider,
            %start,
            ours = job.ours_count,
            theirs = job.theirs_count,
            discrepancies = findings.len(),
            "reconciliation finished"
        );

        let high_findings: Vec<Discrepancy> = findings
            .iter()
            .filter(|finding| finding.severity == Severity::High)
            .cloned()
            .collect();
        self.store.insert_discrepancies(job.id, findings);

        for finding in high_findings {
            self.escalate(provider, start, &finding).await;
        }

        job
    }

    /// Alert + ticket for one high-severity finding. Best-effort: failures
    /// are logged, never propagated.
    async fn escalate(&self, provider: Provider, date: NaiveDate, finding: &Discrepancy) {
        let summary = format!(
            "High-severity {:?} for {provider} on {date}: {}",
            finding.kind, finding.provider_transaction_id
        );
        self.alerts
            .alert(AlertCategory::Reconciliation, &summary, &finding.detail)
            .await;

        if let Err(error) = self
            .tickets
            .file_ticket(
                TicketKind::ReconciliationDiscrepancy,
                &finding.detail,
                TicketPriority::High,
            )
            .await
        {
            warn!(%error, "failed to file reconciliation ticket");
        }
    }
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn to_internal_record(transaction: &Transaction) -> InternalTransaction {
    InternalTransaction {
        transaction_id: transaction.id,
        provider_ref: transaction.reference.clone(),
        amount_minor: transaction.total_amount_minor,
        currency: transaction.currency,
        status: transaction.status,
    }
}
