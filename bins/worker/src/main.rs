//! Tally background worker.
//!
//! Wires the stores, services, and collaborators once at startup, then
//! runs the periodic jobs: nightly ledger verification and daily
//! per-provider reconciliation.

mod collaborators;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tally_services::Services;
use tally_shared::types::Provider;
use tally_shared::AppConfig;
use tally_store::{DisputeStore, LedgerStore, ReconciliationStore};

use crate::collaborators::{EmptyProviderFeed, LogAlertSink, LogTicketing};
use crate::scheduler::Scheduler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Stores and collaborators
    let ledger = Arc::new(LedgerStore::new());
    let disputes = Arc::new(DisputeStore::new());
    let reconciliation = Arc::new(ReconciliationStore::new());

    let services = Services::new(
        &config,
        ledger,
        disputes,
        reconciliation,
        Arc::new(EmptyProviderFeed),
        Arc::new(LogAlertSink),
        Arc::new(LogTicketing),
    );

    // System accounts exist before anything posts against them.
    services.registry.provision_platform_accounts();

    // Register the periodic jobs.
    let mut scheduler = Scheduler::new();

    let verifier = Arc::clone(&services.verifier);
    scheduler.every(
        "ledger-verification",
        Duration::from_secs(config.scheduler.verification_interval_secs),
        move || {
            let verifier = Arc::clone(&verifier);
            async move {
                let result = verifier.perform_verification().await;
                info!(all_valid = result.is_all_valid(), "verification run finished");
            }
        },
    );

    let engine = Arc::clone(&services.reconciliation);
    scheduler.every(
        "daily-reconciliation",
        Duration::from_secs(config.scheduler.reconciliation_interval_secs),
        move || {
            let engine = Arc::clone(&engine);
            async move {
                // Reconcile yesterday, the last complete day.
                let Some(date) = Utc::now().date_naive().pred_opt() else {
                    return;
                };
                for provider in Provider::ALL {
                    let job = engine.reconcile(provider, date).await;
                    info!(%provider, status = ?job.status, "reconciliation job finished");
                }
            }
        },
    );

    info!(
        verification_interval_secs = config.scheduler.verification_interval_secs,
        reconciliation_interval_secs = config.scheduler.reconciliation_interval_secs,
        "worker started"
    );

    scheduler.run().await;
    Ok(())
}
