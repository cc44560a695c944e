//! The ledger verifier: four independent checks, nightly and on demand.
//!
//! Verification only reads. Failures are alerted with enough structure to
//! drive manual remediation and are never auto-corrected.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use tally_core::verification::{
    check_account_balances, check_global_balance, check_orphan_entries,
    check_transaction_consistency, VerificationResult,
};
use tally_store::LedgerStore;

use crate::collaborators::{AlertCategory, AlertSink};

/// The nightly batch verifier, also exposed as an on-demand operation for
/// support/admin use.
pub struct LedgerVerifier {
    store: Arc<LedgerStore>,
    alerts: Arc<dyn AlertSink>,
}

impl LedgerVerifier {
    /// Creates a verifier over the given store and alert sink.
    #[must_use]
    pub fn new(store: Arc<LedgerStore>, alerts: Arc<dyn AlertSink>) -> Self {
        Self { store, alerts }
    }

    /// Runs all four checks and returns the conjunction.
    ///
    /// Each check reads its own consistent snapshot, so a check never
    /// observes a half-applied posting. Any failure raises one
    /// `ledger-verification` alert carrying the structured summary; on a
    /// fully clean run the entries are flagged verified.
    pub async fn perform_verification(&self) -> VerificationResult {
        let snapshot = self.store.snapshot();
        let balance_failures = check_global_balance(&snapshot.entries);

        let snapshot = self.store.snapshot();
        let account_failures = check_account_balances(&snapshot.accounts, &snapshot.entries);

        let snapshot = self.store.snapshot();
        let orphan_failures = check_orphan_entries(&snapshot.entries, &snapshot.transactions);

        let snapshot = self.store.snapshot();
        let consistency_failures =
            check_transaction_consistency(&snapshot.transactions, &snapshot.entries);

        let result = VerificationResult::from_failures(
            balance_failures,
            account_failures,
            orphan_failures,
            consistency_failures,
            Utc::now(),
        );

        if result.is_all_valid() {
            let flipped = self.store.mark_all_verified();
            info!(entries_verified = flipped, "ledger verification passed");
        } else {
            let summary = Self::failed_checks_summary(&result);
            let detail = result
                .failures
                .iter()
                .map(|failure| failure.detail.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            warn!(%summary, failures = result.failures.len(), "ledger verification failed");
            self.alerts
                .alert(AlertCategory::LedgerVerification, &summary, &detail)
                .await;
        }

        result
    }

    fn failed_checks_summary(result: &VerificationResult) -> String {
        let mut failed = Vec::new();
        if !result.balanced {
            failed.push("global balance");
        }
        if !result.accounts_valid {
            failed.push("account balances");
        }
        if !result.no_orphans {
            failed.push("orphan entries");
        }
        if !result.transactions_consistent {
            failed.push("transaction consistency");
        }
        format!(
            "Ledger verification failed: {} ({} finding(s))",
            failed.join(", "),
            result.failures.len()
        )
    }
}
