//! Ledger accounts and balance sign conventions.
//!
//! Every account carries a classification that fixes how debits and credits
//! accumulate into its balance:
//! - Asset/Expense accounts are debit-normal: balance += debit - credit
//! - Liability/Revenue accounts are credit-normal: balance += credit - debit

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, Currency, Money};

/// Who an account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerType {
    /// An end user of the platform.
    User,
    /// A payment provider.
    Provider,
    /// The platform itself.
    Platform,
    /// Internal system accounts (clearing, suspense).
    System,
}

/// Account classification.
///
/// The classification determines the balance sign convention and the
/// domain rules the verifier enforces (asset-like accounts must never go
/// negative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    /// Settled cash held by the platform.
    Cash,
    /// Funds available for payout.
    AvailableBalance,
    /// Funds frozen while a dispute is open.
    DisputeReserve,
    /// Funds held at a payment provider, per provider.
    ProviderBalance,
    /// Amounts owed to counterparties.
    Payable,
    /// Accumulated payouts to providers.
    ProviderPayouts,
    /// Platform revenue.
    PlatformRevenue,
    /// Per-transaction fee revenue.
    TransactionFees,
    /// Provider processing fees paid.
    ProcessingFees,
    /// Chargeback fees paid.
    ChargebackFees,
    /// Dispute handling fees paid.
    DisputeFees,
}

/// Balance sign convention for an account classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceSide {
    /// Debit-normal accounts (asset, expense).
    DebitNormal,
    /// Credit-normal accounts (liability, revenue).
    CreditNormal,
}

impl BalanceSide {
    /// Calculates the balance change for an entry, in minor units.
    #[must_use]
    pub const fn balance_change(self, debit_minor: i64, credit_minor: i64) -> i64 {
        match self {
            Self::DebitNormal => debit_minor - credit_minor,
            Self::CreditNormal => credit_minor - debit_minor,
        }
    }
}

impl AccountCategory {
    /// Returns the sign convention for this classification.
    #[must_use]
    pub const fn balance_side(self) -> BalanceSide {
        match self {
            Self::Cash
            | Self::AvailableBalance
            | Self::DisputeReserve
            | Self::ProviderBalance
            | Self::ProcessingFees
            | Self::ChargebackFees
            | Self::DisputeFees => BalanceSide::DebitNormal,
            Self::Payable
            | Self::ProviderPayouts
            | Self::PlatformRevenue
            | Self::TransactionFees => BalanceSide::CreditNormal,
        }
    }

    /// Returns true for accounts representing funds the platform holds.
    ///
    /// These must never carry a negative balance; the verifier and the
    /// journal's posting policy both enforce this.
    #[must_use]
    pub const fn is_asset_like(self) -> bool {
        matches!(
            self,
            Self::Cash | Self::AvailableBalance | Self::DisputeReserve | Self::ProviderBalance
        )
    }
}

/// Natural key for account resolution: one account per
/// (owner, owner type, classification, currency).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountKey {
    /// External owner identifier (user id, provider name, "platform").
    pub owner_id: String,
    /// Who the owner is.
    pub owner_type: OwnerType,
    /// Account classification.
    pub category: AccountCategory,
    /// Account currency.
    pub currency: Currency,
}

/// A ledger account with its accumulated balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Natural key (owner, owner type, classification, currency).
    pub key: AccountKey,
    /// Accumulated balance in minor units, per the sign convention.
    pub balance_minor: i64,
    /// Monotonically increasing version for optimistic concurrency.
    pub version: i64,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Creates a zero-balance account for the given key.
    #[must_use]
    pub fn open(key: AccountKey, at: DateTime<Utc>) -> Self {
        Self {
            id: AccountId::new(),
            key,
            balance_minor: 0,
            version: 0,
            created_at: at,
        }
    }

    /// Returns the balance change this account sees for an entry.
    #[must_use]
    pub const fn balance_change(&self, debit_minor: i64, credit_minor: i64) -> i64 {
        self.key.category.balance_side().balance_change(debit_minor, credit_minor)
    }

    /// The current balance as money.
    #[must_use]
    pub const fn balance(&self) -> Money {
        Money::new(self.balance_minor, self.key.currency)
    }
}
