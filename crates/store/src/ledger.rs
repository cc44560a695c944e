//! The ledger store: accounts, entries, transactions, and the atomic
//! posting commit.
//!
//! All state lives behind one writer lock; a commit validates every
//! precondition (account existence, version match, idempotency) before the
//! first mutation, so a failed commit leaves nothing behind.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::debug;

use tally_core::ledger::{Account, AccountKey, LedgerEntry, Transaction, TransactionStatus};
use tally_shared::types::{AccountId, Provider, TransactionId};

use crate::error::StoreError;

/// Balance delta for one account, guarded by the version the posting was
/// computed against.
#[derive(Debug, Clone)]
pub struct AccountDelta {
    /// The account to apply the delta to.
    pub account_id: AccountId,
    /// The account version the delta was computed against.
    pub expected_version: i64,
    /// Signed balance change in minor units (per the account's sign rule).
    pub delta_minor: i64,
}

/// One atomic posting: a transaction, its entries, and the balance deltas
/// they imply.
#[derive(Debug, Clone)]
pub struct PostingCommit {
    /// The transaction to store. Committed as Completed.
    pub transaction: Transaction,
    /// The entries to append.
    pub entries: Vec<LedgerEntry>,
    /// Version-guarded balance deltas, one per touched account.
    pub deltas: Vec<AccountDelta>,
}

/// A read-consistent copy of ledger state for the verifier.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    /// All accounts.
    pub accounts: Vec<Account>,
    /// All entries.
    pub entries: Vec<LedgerEntry>,
    /// All transactions.
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<AccountId, Account>,
    account_index: HashMap<AccountKey, AccountId>,
    entries: Vec<LedgerEntry>,
    transactions: HashMap<TransactionId, Transaction>,
    idempotency_index: HashMap<String, TransactionId>,
}

/// Durable ledger state: append-only entries plus mutable account balances.
#[derive(Debug, Default)]
pub struct LedgerStore {
    state: RwLock<LedgerState>,
}

impl LedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        // Poisoning only happens if a writer panicked; the state itself is
        // still consistent because commits validate before mutating.
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Returns the account for the key, creating a zero-balance one on
    /// first reference.
    pub fn get_or_create_account(&self, key: &AccountKey, at: DateTime<Utc>) -> Account {
        let mut state = self.write();
        if let Some(id) = state.account_index.get(key) {
            return state.accounts[id].clone();
        }

        let account = Account::open(key.clone(), at);
        debug!(account_id = %account.id, category = ?key.category, "account created");
        state.account_index.insert(key.clone(), account.id);
        state.accounts.insert(account.id, account.clone());
        account
    }

    /// Looks up an account by id.
    pub fn account(&self, id: AccountId) -> Result<Account, StoreError> {
        self.read()
            .accounts
            .get(&id)
            .cloned()
            .ok_or(StoreError::AccountNotFound(id))
    }

    /// Looks up an account by natural key without creating it.
    #[must_use]
    pub fn find_account(&self, key: &AccountKey) -> Option<Account> {
        let state = self.read();
        state
            .account_index
            .get(key)
            .map(|id| state.accounts[id].clone())
    }

    /// Current balance of an account, in minor units.
    pub fn balance_of(&self, id: AccountId) -> Result<i64, StoreError> {
        self.account(id).map(|account| account.balance_minor)
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Looks up a transaction by id.
    pub fn transaction(&self, id: TransactionId) -> Result<Transaction, StoreError> {
        self.read()
            .transactions
            .get(&id)
            .cloned()
            .ok_or(StoreError::TransactionNotFound(id))
    }

    /// Returns the completed transaction holding the idempotency key, if any.
    #[must_use]
    pub fn find_by_idempotency_key(&self, key: &str) -> Option<Transaction> {
        let state = self.read();
        state
            .idempotency_index
            .get(key)
            .and_then(|id| state.transactions.get(id))
            .cloned()
    }

    /// Returns the completed transaction with the given external reference
    /// for a provider, if any.
    #[must_use]
    pub fn find_by_provider_reference(
        &self,
        provider: Provider,
        reference: &str,
    ) -> Option<Transaction> {
        self.read()
            .transactions
            .values()
            .find(|txn| {
                txn.provider == Some(provider)
                    && txn.reference == reference
                    && txn.status == TransactionStatus::Completed
            })
            .cloned()
    }

    /// Completed transactions for a provider within `[start, end)`.
    #[must_use]
    pub fn transactions_for_provider(
        &self,
        provider: Provider,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<Transaction> {
        let mut transactions: Vec<Transaction> = self
            .read()
            .transactions
            .values()
            .filter(|txn| {
                txn.provider == Some(provider)
                    && txn.status == TransactionStatus::Completed
                    && txn.created_at >= start
                    && txn.created_at < end
            })
            .cloned()
            .collect();
        transactions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        transactions
    }

    /// Records a transaction that failed before any entry was written.
    ///
    /// Failed transactions carry no entries; the verifier treats any entry
    /// pointing at one as an orphan.
    pub fn insert_failed(&self, mut transaction: Transaction) {
        transaction.status = TransactionStatus::Failed;
        self.write()
            .transactions
            .insert(transaction.id, transaction);
    }

    // ========================================================================
    // The atomic posting unit
    // ========================================================================

    /// Applies one posting all-or-nothing.
    ///
    /// Validates before the first mutation:
    /// 1. every touched account exists,
    /// 2. every account's version still matches the one the posting was
    ///    computed against,
    /// 3. the idempotency key (if any) is unused.
    ///
    /// Then appends the entries, applies the balance deltas, bumps account
    /// versions, and stores the transaction as Completed.
    ///
    /// # Errors
    ///
    /// `VersionConflict` if a concurrent posting touched one of the
    /// accounts first; the caller re-reads and retries.
    pub fn commit_posting(&self, commit: PostingCommit) -> Result<Transaction, StoreError> {
        let mut state = self.write();

        // Validate everything up front; nothing below this block fails.
        for delta in &commit.deltas {
            let account = state
                .accounts
                .get(&delta.account_id)
                .ok_or(StoreError::AccountNotFound(delta.account_id))?;
            if account.version != delta.expected_version {
                return Err(StoreError::VersionConflict {
                    account_id: delta.account_id,
                    expected: delta.expected_version,
                    actual: account.version,
                });
            }
        }
        if let Some(key) = &commit.transaction.idempotency_key {
            if let Some(existing) = state.idempotency_index.get(key) {
                return Err(StoreError::IdempotencyKeyTaken(*existing));
            }
        }

        // Apply.
        let mut transaction = commit.transaction;
        transaction.status = TransactionStatus::Completed;
        transaction.completed_at = Some(Utc::now());

        for delta in &commit.deltas {
            let account = state
                .accounts
                .get_mut(&delta.account_id)
                .expect("validated above");
            account.balance_minor += delta.delta_minor;
            account.version += 1;
        }
        state.entries.extend(commit.entries);
        if let Some(key) = &transaction.idempotency_key {
            state.idempotency_index.insert(key.clone(), transaction.id);
        }
        debug!(
            transaction_id = %transaction.id,
            transaction_type = ?transaction.transaction_type,
            amount_minor = transaction.total_amount_minor,
            "posting committed"
        );
        state.transactions.insert(transaction.id, transaction.clone());

        Ok(transaction)
    }

    // ========================================================================
    // Snapshots & verification support
    // ========================================================================

    /// Returns a read-consistent copy of the full ledger state.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.read();
        LedgerSnapshot {
            accounts: state.accounts.values().cloned().collect(),
            entries: state.entries.clone(),
            transactions: state.transactions.values().cloned().collect(),
        }
    }

    /// Overwrites one entry's amount in place, bypassing every invariant.
    ///
    /// Exists only so tests can inject the corruption the verifier must
    /// catch. Returns false if the entry is unknown.
    #[cfg(feature = "testing")]
    pub fn corrupt_entry_amount(
        &self,
        entry_id: tally_shared::types::LedgerEntryId,
        amount_minor: i64,
    ) -> bool {
        let mut state = self.write();
        match state.entries.iter_mut().find(|entry| entry.id == entry_id) {
            Some(entry) => {
                entry.amount_minor = amount_minor;
                true
            }
            None => false,
        }
    }

    /// Marks every entry as verified; returns how many flipped.
    ///
    /// Called by the verifier after a fully clean run.
    pub fn mark_all_verified(&self) -> usize {
        let mut state = self.write();
        let mut flipped = 0;
        for entry in &mut state.entries {
            if !entry.verified {
                entry.verified = true;
                flipped += 1;
            }
        }
        flipped
    }
}
