//! Composition layer for Tally.
//!
//! This crate wires the pure core logic to the store and the external
//! collaborators, and exposes the four entry points other subsystems call:
//!
//! - [`TransactionJournal::post`]: atomic, idempotent double-entry posting
//! - [`LedgerVerifier::perform_verification`]: the four nightly checks
//! - [`ReconciliationEngine::reconcile`]: provider statement diffing
//! - [`DisputeCoordinator::handle_event`]: dispute webhooks and freezes
//!
//! Each component is a struct constructed once at process start with its
//! collaborators passed in; there is no hidden global registry.

pub mod collaborators;
pub mod disputes;
pub mod journal;
pub mod reconciliation;
pub mod registry;
pub mod verifier;

use std::sync::Arc;

use tally_shared::AppConfig;
use tally_store::{DisputeStore, LedgerStore, ReconciliationStore};

use crate::collaborators::{AlertSink, ProviderFeed, Ticketing};
pub use crate::disputes::DisputeCoordinator;
pub use crate::journal::TransactionJournal;
pub use crate::reconciliation::ReconciliationEngine;
pub use crate::registry::AccountRegistry;
pub use crate::verifier::LedgerVerifier;

/// All services, wired once at startup.
#[derive(Clone)]
pub struct Services {
    /// Account resolution and system account provisioning.
    pub registry: Arc<AccountRegistry>,
    /// The posting entry point.
    pub journal: Arc<TransactionJournal>,
    /// The nightly/on-demand verifier.
    pub verifier: Arc<LedgerVerifier>,
    /// The daily/manual reconciliation engine.
    pub reconciliation: Arc<ReconciliationEngine>,
    /// The dispute webhook handler.
    pub disputes: Arc<DisputeCoordinator>,
}

impl Services {
    /// Wires every component with shared stores and collaborators.
    #[must_use]
    pub fn new(
        config: &AppConfig,
        ledger: Arc<LedgerStore>,
        dispute_store: Arc<DisputeStore>,
        reconciliation_store: Arc<ReconciliationStore>,
        feed: Arc<dyn ProviderFeed>,
        alerts: Arc<dyn AlertSink>,
        tickets: Arc<dyn Ticketing>,
    ) -> Self {
        let registry = Arc::new(AccountRegistry::new(Arc::clone(&ledger)));
        let journal = Arc::new(TransactionJournal::new(Arc::clone(&ledger)));
        let verifier = Arc::new(LedgerVerifier::new(
            Arc::clone(&ledger),
            Arc::clone(&alerts),
        ));
        let reconciliation = Arc::new(ReconciliationEngine::new(
            Arc::clone(&ledger),
            reconciliation_store,
            feed,
            Arc::clone(&alerts),
            Arc::clone(&tickets),
            &config.reconciliation,
        ));
        let disputes = Arc::new(DisputeCoordinator::new(
            ledger,
            dispute_store,
            Arc::clone(&journal),
            Arc::clone(&registry),
            alerts,
            tickets,
            &config.disputes,
        ));

        Self {
            registry,
            journal,
            verifier,
            reconciliation,
            disputes,
        }
    }
}
