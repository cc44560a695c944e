//! Account resolution and system account provisioning.
//!
//! Accounts are created lazily on first reference, with one exception:
//! the fixed platform system accounts are provisioned at startup, and
//! their absence afterwards is fatal.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use tally_core::ledger::{Account, AccountCategory, AccountKey, LedgerError, OwnerType};
use tally_shared::types::{AccountId, Currency};
use tally_store::LedgerStore;

/// Owner id carried by every platform system account.
pub const PLATFORM_OWNER: &str = "platform";

/// The classifications provisioned for the platform in every currency.
const PLATFORM_CATEGORIES: [AccountCategory; 5] = [
    AccountCategory::Cash,
    AccountCategory::AvailableBalance,
    AccountCategory::DisputeReserve,
    AccountCategory::PlatformRevenue,
    AccountCategory::TransactionFees,
];

/// Resolves and creates accounts by (owner, owner type, classification,
/// currency).
pub struct AccountRegistry {
    store: Arc<LedgerStore>,
}

impl AccountRegistry {
    /// Creates a registry over the given store.
    #[must_use]
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Returns the account for the key, creating a zero-balance one on
    /// first lookup. The account is persisted before any entry can
    /// reference it.
    pub fn get_or_create(
        &self,
        owner_id: impl Into<String>,
        owner_type: OwnerType,
        category: AccountCategory,
        currency: Currency,
    ) -> Account {
        self.store.get_or_create_account(
            &AccountKey {
                owner_id: owner_id.into(),
                owner_type,
                category,
                currency,
            },
            Utc::now(),
        )
    }

    /// Current balance of an account, in minor units.
    pub fn balance_of(&self, account_id: AccountId) -> Result<i64, LedgerError> {
        self.store
            .balance_of(account_id)
            .map_err(|_| LedgerError::AccountNotFound(account_id))
    }

    /// Creates the fixed platform system accounts for every supported
    /// currency. Idempotent; called once at process start.
    pub fn provision_platform_accounts(&self) -> Vec<Account> {
        let mut accounts = Vec::new();
        for currency in Currency::ALL {
            for category in PLATFORM_CATEGORIES {
                accounts.push(self.get_or_create(
                    PLATFORM_OWNER,
                    OwnerType::Platform,
                    category,
                    currency,
                ));
            }
        }
        info!(count = accounts.len(), "platform system accounts provisioned");
        accounts
    }

    /// Looks up a platform system account. Unlike `get_or_create`, a miss
    /// here is fatal: system accounts are provisioned at startup, never
    /// lazily.
    pub fn platform_account(
        &self,
        category: AccountCategory,
        currency: Currency,
    ) -> Result<Account, LedgerError> {
        self.store
            .find_account(&AccountKey {
                owner_id: PLATFORM_OWNER.to_string(),
                owner_type: OwnerType::Platform,
                category,
                currency,
            })
            .ok_or(LedgerError::SystemAccountMissing { category, currency })
    }
}
