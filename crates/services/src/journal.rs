//! The transaction journal: atomic, idempotent double-entry posting.
//!
//! `post` is the single write path into the ledger. Every caller (payment
//! capture, payout, refund, dispute freeze/unfreeze) goes through here,
//! and the journal rejects anything that does not net to zero before a
//! single row is written.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use tally_core::ledger::{
    validate_posting, LedgerEntry, LedgerError, PostingRequest, Transaction, TransactionStatus,
};
use tally_shared::types::{AccountId, LedgerEntryId, TransactionId};
use tally_store::{AccountDelta, LedgerStore, PostingCommit, StoreError};

/// How many times a posting retries after a version conflict before it is
/// recorded as Failed.
const MAX_POSTING_ATTEMPTS: u32 = 5;

/// The posting entry point.
pub struct TransactionJournal {
    store: Arc<LedgerStore>,
}

impl TransactionJournal {
    /// Creates a journal over the given store.
    #[must_use]
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Posts a balanced set of legs as one Completed transaction.
    ///
    /// Validation happens before any write; the commit applies entries,
    /// balance deltas, and the status flip as one unit. If a concurrent
    /// posting touches one of the same accounts first, the whole posting
    /// is recomputed against fresh balances and retried.
    ///
    /// Idempotency: if a Completed transaction already holds the request's
    /// idempotency key, that transaction is returned unchanged; duplicate
    /// webhook deliveries are no-ops.
    ///
    /// # Errors
    ///
    /// - `UnbalancedPosting` and friends if the legs are malformed
    /// - `AccountNotFound` if a leg references an unknown account
    /// - `InsufficientBalance` if the posting would drive an asset-like
    ///   account negative
    /// - `ConcurrentModification` once retries are exhausted
    pub fn post(&self, request: PostingRequest) -> Result<Transaction, LedgerError> {
        let totals = validate_posting(&request)?;

        if let Some(key) = &request.idempotency_key {
            if let Some(existing) = self.store.find_by_idempotency_key(key) {
                debug!(idempotency_key = %key, transaction_id = %existing.id, "duplicate posting suppressed");
                return Ok(existing);
            }
        }

        for attempt in 1..=MAX_POSTING_ATTEMPTS {
            match self.try_post(&request, totals.total_amount_minor()) {
                Ok(transaction) => return Ok(transaction),
                Err(LedgerError::AccountVersionMismatch { account_id, .. }) => {
                    warn!(
                        %account_id,
                        attempt,
                        reference = %request.reference,
                        "posting hit a version conflict, retrying"
                    );
                }
                Err(other) => return Err(other),
            }
        }

        // Record the exhausted posting for audit; it carries no entries.
        self.store.insert_failed(Transaction {
            id: TransactionId::new(),
            transaction_type: request.transaction_type,
            status: TransactionStatus::Failed,
            reference: request.reference.clone(),
            provider: request.provider,
            idempotency_key: None,
            currency: request.currency,
            total_amount_minor: totals.total_amount_minor(),
            created_at: Utc::now(),
            completed_at: None,
        });
        Err(LedgerError::ConcurrentModification)
    }

    /// One read-compute-commit attempt.
    fn try_post(
        &self,
        request: &PostingRequest,
        total_amount_minor: i64,
    ) -> Result<Transaction, LedgerError> {
        let now = Utc::now();

        // Read phase: fetch every touched account once, then aggregate the
        // net delta per account from its legs.
        let mut accounts: HashMap<AccountId, tally_core::ledger::Account> = HashMap::new();
        for leg in &request.legs {
            if !accounts.contains_key(&leg.account_id) {
                let account = self
                    .store
                    .account(leg.account_id)
                    .map_err(|_| LedgerError::AccountNotFound(leg.account_id))?;
                accounts.insert(leg.account_id, account);
            }
        }

        let mut deltas: HashMap<AccountId, AccountDelta> = accounts
            .values()
            .map(|account| {
                (
                    account.id,
                    AccountDelta {
                        account_id: account.id,
                        expected_version: account.version,
                        delta_minor: 0,
                    },
                )
            })
            .collect();
        for leg in &request.legs {
            let account = &accounts[&leg.account_id];
            let delta = deltas
                .get_mut(&leg.account_id)
                .ok_or(LedgerError::AccountNotFound(leg.account_id))?;
            delta.delta_minor +=
                account.balance_change(leg.debit_minor(), leg.credit_minor());
        }

        // Policy phase: asset-like accounts must not go negative.
        for delta in deltas.values() {
            let account = &accounts[&delta.account_id];
            if account.key.category.is_asset_like()
                && account.balance_minor + delta.delta_minor < 0
            {
                return Err(LedgerError::InsufficientBalance {
                    account_id: account.id,
                    balance_minor: account.balance_minor,
                    requested_minor: -delta.delta_minor,
                });
            }
        }

        // Build the transaction and its entries.
        let transaction = Transaction {
            id: TransactionId::new(),
            transaction_type: request.transaction_type,
            status: TransactionStatus::Pending,
            reference: request.reference.clone(),
            provider: request.provider,
            idempotency_key: request.idempotency_key.clone(),
            currency: request.currency,
            total_amount_minor,
            created_at: now,
            completed_at: None,
        };
        let entries: Vec<LedgerEntry> = request
            .legs
            .iter()
            .map(|leg| LedgerEntry {
                id: LedgerEntryId::new(),
                transaction_id: Some(transaction.id),
                account_id: leg.account_id,
                direction: leg.direction,
                amount_minor: leg.amount_minor,
                currency: request.currency,
                description: leg.description.clone(),
                event_at: now,
                verified: false,
            })
            .collect();

        // Commit phase.
        match self.store.commit_posting(PostingCommit {
            transaction,
            entries,
            deltas: deltas.into_values().collect(),
        }) {
            Ok(transaction) => Ok(transaction),
            Err(StoreError::VersionConflict {
                account_id,
                expected,
                actual,
            }) => Err(LedgerError::AccountVersionMismatch {
                account_id,
                expected,
                actual,
            }),
            Err(StoreError::IdempotencyKeyTaken(existing_id)) => {
                // Lost a race on the same key: the other posting is the
                // one true transaction.
                self.store
                    .transaction(existing_id)
                    .map_err(|err| LedgerError::Storage(err.to_string()))
            }
            Err(StoreError::AccountNotFound(account_id)) => {
                Err(LedgerError::AccountNotFound(account_id))
            }
            Err(other) => Err(LedgerError::Storage(other.to_string())),
        }
    }
}
