//! The four ledger checks as pure functions over snapshots.
//!
//! Each check takes the slices it needs and returns a failure list; an
//! empty list is a pass. The caller is responsible for handing every check
//! a consistent snapshot.

use std::collections::HashMap;

use tally_shared::types::{Currency, TransactionId};

use crate::ledger::{Account, LedgerEntry, Transaction, TransactionStatus};

use super::types::{CheckFailure, CheckKind};

/// Check 1: global double-entry balance.
///
/// For every currency, the sum of all debit entry amounts must equal the
/// sum of all credit entry amounts.
#[must_use]
pub fn check_global_balance(entries: &[LedgerEntry]) -> Vec<CheckFailure> {
    let mut totals: HashMap<Currency, (i64, i64)> = HashMap::new();

    for entry in entries {
        let (debits, credits) = totals.entry(entry.currency).or_insert((0, 0));
        *debits += entry.debit_minor();
        *credits += entry.credit_minor();
    }

    let mut failures: Vec<CheckFailure> = totals
        .into_iter()
        .filter(|(_, (debits, credits))| debits != credits)
        .map(|(currency, (debits, credits))| CheckFailure {
            check: CheckKind::GlobalBalance,
            detail: format!(
                "{currency}: debits {debits} != credits {credits} (off by {})",
                debits - credits
            ),
        })
        .collect();
    failures.sort_by(|a, b| a.detail.cmp(&b.detail));
    failures
}

/// Check 2: per-account balance validity.
///
/// Recomputes each account's balance from its entries using the
/// classification sign rule, asserts it matches the stored balance, and
/// asserts asset-like accounts are not negative.
#[must_use]
pub fn check_account_balances(
    accounts: &[Account],
    entries: &[LedgerEntry],
) -> Vec<CheckFailure> {
    let mut derived: HashMap<_, i64> = HashMap::new();
    let by_id: HashMap<_, &Account> = accounts.iter().map(|a| (a.id, a)).collect();

    for entry in entries {
        if let Some(account) = by_id.get(&entry.account_id) {
            *derived.entry(entry.account_id).or_insert(0) +=
                account.balance_change(entry.debit_minor(), entry.credit_minor());
        }
    }

    let mut failures = Vec::new();
    for account in accounts {
        let derived_balance = derived.get(&account.id).copied().unwrap_or(0);

        if account.balance_minor != derived_balance {
            failures.push(CheckFailure {
                check: CheckKind::AccountBalances,
                detail: format!(
                    "Account {} ({:?}): stored {} != derived {}",
                    account.id, account.key.category, account.balance_minor, derived_balance
                ),
            });
        }

        if account.key.category.is_asset_like() && account.balance_minor < 0 {
            failures.push(CheckFailure {
                check: CheckKind::AccountBalances,
                detail: format!(
                    "Account {} ({:?}): asset-like balance is negative ({})",
                    account.id, account.key.category, account.balance_minor
                ),
            });
        }
    }
    failures
}

/// Check 3: orphan detection.
///
/// No entry may reference a transaction that is missing or invisible
/// (Failed, or still Pending; committed entries only exist for Completed
/// transactions).
#[must_use]
pub fn check_orphan_entries(
    entries: &[LedgerEntry],
    transactions: &[Transaction],
) -> Vec<CheckFailure> {
    let by_id: HashMap<TransactionId, &Transaction> =
        transactions.iter().map(|t| (t.id, t)).collect();

    let mut failures = Vec::new();
    for entry in entries {
        let Some(transaction_id) = entry.transaction_id else {
            // System-level entries carry no transaction.
            continue;
        };

        match by_id.get(&transaction_id) {
            None => failures.push(CheckFailure {
                check: CheckKind::OrphanEntries,
                detail: format!("Entry {} references missing transaction {transaction_id}", entry.id),
            }),
            Some(transaction) if !transaction.is_visible() => failures.push(CheckFailure {
                check: CheckKind::OrphanEntries,
                detail: format!(
                    "Entry {} references {:?} transaction {transaction_id}",
                    entry.id, transaction.status
                ),
            }),
            Some(_) => {}
        }
    }
    failures
}

/// Check 4: per-transaction balance.
///
/// Every Completed transaction's entries must net to zero on their own.
/// This catches partial-posting bugs even when the global sum happens to
/// balance.
#[must_use]
pub fn check_transaction_consistency(
    transactions: &[Transaction],
    entries: &[LedgerEntry],
) -> Vec<CheckFailure> {
    let mut net: HashMap<TransactionId, i64> = HashMap::new();
    let mut entry_counts: HashMap<TransactionId, usize> = HashMap::new();

    for entry in entries {
        if let Some(transaction_id) = entry.transaction_id {
            *net.entry(transaction_id).or_insert(0) += entry.signed_amount();
            *entry_counts.entry(transaction_id).or_insert(0) += 1;
        }
    }

    let mut failures = Vec::new();
    for transaction in transactions {
        if transaction.status != TransactionStatus::Completed {
            continue;
        }

        let count = entry_counts.get(&transaction.id).copied().unwrap_or(0);
        if count == 0 {
            failures.push(CheckFailure {
                check: CheckKind::TransactionConsistency,
                detail: format!("Completed transaction {} has no entries", transaction.id),
            });
            continue;
        }

        let net_amount = net.get(&transaction.id).copied().unwrap_or(0);
        if net_amount != 0 {
            failures.push(CheckFailure {
                check: CheckKind::TransactionConsistency,
                detail: format!(
                    "Transaction {} entries net to {net_amount}, not zero",
                    transaction.id
                ),
            });
        }
    }
    failures
}
