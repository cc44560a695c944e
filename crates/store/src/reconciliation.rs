//! Reconciliation job and discrepancy persistence.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, NaiveDate, Utc};

use tally_core::reconciliation::{Discrepancy, ReconciliationJob};
use tally_shared::types::{DiscrepancyId, Provider, ReconciliationJobId};

/// A persisted discrepancy with its resolution state.
#[derive(Debug, Clone)]
pub struct DiscrepancyRecord {
    /// Unique identifier.
    pub id: DiscrepancyId,
    /// The job that found it.
    pub job_id: ReconciliationJobId,
    /// The classified finding.
    pub finding: Discrepancy,
    /// Whether an operator resolved it.
    pub resolved: bool,
    /// Resolution notes.
    pub notes: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct ReconciliationState {
    jobs: HashMap<ReconciliationJobId, ReconciliationJob>,
    // Insertion-ordered so a job's findings read back in creation order.
    discrepancies: Vec<DiscrepancyRecord>,
}

/// Reconciliation store.
#[derive(Debug, Default)]
pub struct ReconciliationStore {
    state: RwLock<ReconciliationState>,
}

impl ReconciliationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, ReconciliationState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ReconciliationState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persists a job (insert or update).
    pub fn upsert_job(&self, job: ReconciliationJob) {
        self.write().jobs.insert(job.id, job);
    }

    /// Looks up a job by id.
    #[must_use]
    pub fn job(&self, id: ReconciliationJobId) -> Option<ReconciliationJob> {
        self.read().jobs.get(&id).cloned()
    }

    /// All jobs for a (provider, date) pair, newest first.
    ///
    /// Re-running a day creates a new job record, so there can be several.
    #[must_use]
    pub fn jobs_for(&self, provider: Provider, date: NaiveDate) -> Vec<ReconciliationJob> {
        let mut jobs: Vec<ReconciliationJob> = self
            .read()
            .jobs
            .values()
            .filter(|job| job.provider == provider && job.period_start == date)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        jobs
    }

    /// Persists the findings of one job and returns the stored records.
    pub fn insert_discrepancies(
        &self,
        job_id: ReconciliationJobId,
        findings: Vec<Discrepancy>,
    ) -> Vec<DiscrepancyRecord> {
        let now = Utc::now();
        let records: Vec<DiscrepancyRecord> = findings
            .into_iter()
            .map(|finding| DiscrepancyRecord {
                id: DiscrepancyId::new(),
                job_id,
                finding,
                resolved: false,
                notes: None,
                created_at: now,
            })
            .collect();

        self.write().discrepancies.extend(records.iter().cloned());
        records
    }

    /// All discrepancies recorded under a job, in creation order.
    #[must_use]
    pub fn discrepancies_for_job(&self, job_id: ReconciliationJobId) -> Vec<DiscrepancyRecord> {
        self.read()
            .discrepancies
            .iter()
            .filter(|record| record.job_id == job_id)
            .cloned()
            .collect()
    }

    /// Marks a discrepancy resolved with operator notes.
    ///
    /// Returns false if the id is unknown.
    pub fn resolve_discrepancy(&self, id: DiscrepancyId, notes: impl Into<String>) -> bool {
        let mut state = self.write();
        match state
            .discrepancies
            .iter_mut()
            .find(|record| record.id == id)
        {
            Some(record) => {
                record.resolved = true;
                record.notes = Some(notes.into());
                true
            }
            None => false,
        }
    }
}
