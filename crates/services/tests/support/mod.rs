//! Shared wiring for the service-level scenario tests: an in-memory store
//! stack plus recording collaborator stubs.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tally_core::reconciliation::ProviderTransaction;
use tally_services::collaborators::{
    AlertCategory, AlertSink, FeedError, ProviderFeed, Ticketing, TicketKind, TicketPriority,
    TicketingError,
};
use tally_services::Services;
use tally_shared::types::{Provider, TicketId};
use tally_shared::AppConfig;
use tally_store::{DisputeStore, LedgerStore, ReconciliationStore};

/// A provider feed serving a fixed statement per provider.
#[derive(Default)]
pub struct StaticFeed {
    statements: Mutex<Vec<(Provider, Vec<ProviderTransaction>)>>,
    failing: Mutex<Vec<Provider>>,
}

impl StaticFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_statement(&self, provider: Provider, transactions: Vec<ProviderTransaction>) {
        self.statements
            .lock()
            .unwrap()
            .push((provider, transactions));
    }

    pub fn fail_provider(&self, provider: Provider) {
        self.failing.lock().unwrap().push(provider);
    }
}

#[async_trait]
impl ProviderFeed for StaticFeed {
    async fn list_transactions(
        &self,
        provider: Provider,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<ProviderTransaction>, FeedError> {
        if self.failing.lock().unwrap().contains(&provider) {
            return Err(FeedError::Unavailable(format!("{provider} outage")));
        }
        Ok(self
            .statements
            .lock()
            .unwrap()
            .iter()
            .filter(|(statement_provider, _)| *statement_provider == provider)
            .flat_map(|(_, transactions)| transactions.clone())
            .collect())
    }
}

/// Records every alert raised.
#[derive(Default)]
pub struct RecordingAlerts {
    pub alerts: Mutex<Vec<(AlertCategory, String)>>,
}

impl RecordingAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.alerts.lock().unwrap().len()
    }

    pub fn summaries(&self) -> Vec<String> {
        self.alerts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, summary)| summary.clone())
            .collect()
    }
}

#[async_trait]
impl AlertSink for RecordingAlerts {
    async fn alert(&self, category: AlertCategory, summary: &str, _detail: &str) {
        self.alerts
            .lock()
            .unwrap()
            .push((category, summary.to_string()));
    }
}

/// Records every ticket filed.
#[derive(Default)]
pub struct RecordingTickets {
    pub tickets: Mutex<Vec<(TicketKind, TicketPriority, String)>>,
}

impl RecordingTickets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.tickets.lock().unwrap().len()
    }

    pub fn kinds(&self) -> Vec<TicketKind> {
        self.tickets
            .lock()
            .unwrap()
            .iter()
            .map(|(kind, _, _)| *kind)
            .collect()
    }
}

#[async_trait]
impl Ticketing for RecordingTickets {
    async fn file_ticket(
        &self,
        kind: TicketKind,
        description: &str,
        priority: TicketPriority,
    ) -> Result<TicketId, TicketingError> {
        self.tickets
            .lock()
            .unwrap()
            .push((kind, priority, description.to_string()));
        Ok(TicketId::new())
    }
}

/// The full service stack over fresh in-memory stores.
pub struct Harness {
    pub services: Services,
    pub ledger: Arc<LedgerStore>,
    pub reconciliation_store: Arc<ReconciliationStore>,
    pub feed: Arc<StaticFeed>,
    pub alerts: Arc<RecordingAlerts>,
    pub tickets: Arc<RecordingTickets>,
}

impl Harness {
    pub fn new() -> Self {
        let ledger = Arc::new(LedgerStore::new());
        let dispute_store = Arc::new(DisputeStore::new());
        let reconciliation_store = Arc::new(ReconciliationStore::new());
        let feed = Arc::new(StaticFeed::new());
        let alerts = Arc::new(RecordingAlerts::new());
        let tickets = Arc::new(RecordingTickets::new());

        let config = AppConfig {
            reconciliation: tally_shared::config::ReconciliationConfig::default(),
            disputes: tally_shared::config::DisputeConfig::default(),
            scheduler: tally_shared::config::SchedulerConfig::default(),
        };

        let services = Services::new(
            &config,
            Arc::clone(&ledger),
            dispute_store,
            Arc::clone(&reconciliation_store),
            Arc::clone(&feed) as Arc<dyn ProviderFeed>,
            Arc::clone(&alerts) as Arc<dyn AlertSink>,
            Arc::clone(&tickets) as Arc<dyn Ticketing>,
        );
        services.registry.provision_platform_accounts();

        Self {
            services,
            ledger,
            reconciliation_store,
            feed,
            alerts,
            tickets,
        }
    }
}
