//! Stand-in collaborator wiring.
//!
//! The real provider feed, alert delivery, and ticketing live outside this
//! system; these implementations log what would be sent so the worker runs
//! standalone.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use tally_core::reconciliation::ProviderTransaction;
use tally_services::collaborators::{
    AlertCategory, AlertSink, FeedError, ProviderFeed, Ticketing, TicketKind, TicketPriority,
    TicketingError,
};
use tally_shared::types::{Provider, TicketId};

/// A provider feed with nothing to report.
pub struct EmptyProviderFeed;

#[async_trait]
impl ProviderFeed for EmptyProviderFeed {
    async fn list_transactions(
        &self,
        provider: Provider,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ProviderTransaction>, FeedError> {
        info!(%provider, %start, %end, "provider feed queried (no upstream wired)");
        Ok(vec![])
    }
}

/// Logs alerts instead of delivering them.
pub struct LogAlertSink;

#[async_trait]
impl AlertSink for LogAlertSink {
    async fn alert(&self, category: AlertCategory, summary: &str, detail: &str) {
        warn!(%category, summary, detail, "alert raised");
    }
}

/// Logs tickets instead of filing them.
pub struct LogTicketing;

#[async_trait]
impl Ticketing for LogTicketing {
    async fn file_ticket(
        &self,
        kind: TicketKind,
        description: &str,
        priority: TicketPriority,
    ) -> Result<TicketId, TicketingError> {
        let ticket_id = TicketId::new();
        info!(?kind, ?priority, %ticket_id, description, "ticket filed");
        Ok(ticket_id)
    }
}
