//! Dispute persistence.
//!
//! Disputes are keyed by their internal id and indexed by
//! (provider, provider dispute id), the natural key every provider
//! lifecycle event carries.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tally_core::dispute::Dispute;
use tally_shared::types::{DisputeId, Provider};

#[derive(Debug, Default)]
struct DisputeState {
    disputes: HashMap<DisputeId, Dispute>,
    provider_index: HashMap<(Provider, String), DisputeId>,
}

/// Dispute store.
#[derive(Debug, Default)]
pub struct DisputeStore {
    state: RwLock<DisputeState>,
}

impl DisputeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, DisputeState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DisputeState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserts a dispute, or returns the existing one if the provider
    /// dispute id is already on record (duplicate webhook delivery).
    pub fn insert_or_get(&self, dispute: Dispute) -> Dispute {
        let mut state = self.write();
        let index_key = (dispute.provider, dispute.provider_dispute_id.clone());

        if let Some(existing_id) = state.provider_index.get(&index_key) {
            return state.disputes[existing_id].clone();
        }

        state.provider_index.insert(index_key, dispute.id);
        state.disputes.insert(dispute.id, dispute.clone());
        dispute
    }

    /// Looks up a dispute by internal id.
    #[must_use]
    pub fn get(&self, id: DisputeId) -> Option<Dispute> {
        self.read().disputes.get(&id).cloned()
    }

    /// Looks up a dispute by its provider's identifier.
    #[must_use]
    pub fn find_by_provider_id(
        &self,
        provider: Provider,
        provider_dispute_id: &str,
    ) -> Option<Dispute> {
        let state = self.read();
        state
            .provider_index
            .get(&(provider, provider_dispute_id.to_string()))
            .and_then(|id| state.disputes.get(id))
            .cloned()
    }

    /// Persists an updated dispute.
    pub fn update(&self, dispute: Dispute) {
        self.write().disputes.insert(dispute.id, dispute);
    }

    /// All disputes, in no particular order.
    #[must_use]
    pub fn all(&self) -> Vec<Dispute> {
        self.read().disputes.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tally_core::dispute::{DisputeReason, DisputeStatus};
    use tally_shared::types::{Currency, TransactionId};

    fn make_dispute(provider_dispute_id: &str) -> Dispute {
        Dispute {
            id: DisputeId::new(),
            provider: Provider::Stripe,
            provider_dispute_id: provider_dispute_id.to_string(),
            transaction_id: TransactionId::new(),
            status: DisputeStatus::UnderReview,
            reason: DisputeReason::Fraudulent,
            disputed_amount_minor: 20_000,
            currency: Currency::Usd,
            evidence_due_by: None,
            opened_at: Utc::now(),
            resolved_at: None,
        }
    }

    #[test]
    fn test_insert_is_idempotent_on_provider_id() {
        let store = DisputeStore::new();

        let first = store.insert_or_get(make_dispute("dp_1"));
        let second = store.insert_or_get(make_dispute("dp_1"));

        assert_eq!(first.id, second.id);
        assert_eq!(store.all().len(), 1);
    }

    #[test]
    fn test_find_by_provider_id() {
        let store = DisputeStore::new();
        let dispute = store.insert_or_get(make_dispute("dp_2"));

        let found = store.find_by_provider_id(Provider::Stripe, "dp_2").unwrap();
        assert_eq!(found.id, dispute.id);

        // Same id under a different provider is a different dispute.
        assert!(store.find_by_provider_id(Provider::Adyen, "dp_2").is_none());
    }

    #[test]
    fn test_update_persists_status() {
        let store = DisputeStore::new();
        let mut dispute = store.insert_or_get(make_dispute("dp_3"));

        dispute.status = DisputeStatus::Won;
        store.update(dispute.clone());

        assert_eq!(store.get(dispute.id).unwrap().status, DisputeStatus::Won);
    }
}
