//! Posting requests and write-time validation.
//!
//! `validate_posting` is the single enforcement point for the double-entry
//! invariant: every posting that reaches the store has already been proven
//! to net to zero in a single currency.

use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, Currency, Provider};

use super::entry::EntryDirection;
use super::error::LedgerError;
use super::transaction::TransactionType;

/// A single leg of a posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingLeg {
    /// The account to post to.
    pub account_id: AccountId,
    /// Whether this leg debits or credits the account.
    pub direction: EntryDirection,
    /// Amount in minor units (must be positive).
    pub amount_minor: i64,
    /// Description for this leg.
    pub description: String,
}

impl PostingLeg {
    /// Creates a debit leg.
    #[must_use]
    pub fn debit(account_id: AccountId, amount_minor: i64, description: impl Into<String>) -> Self {
        Self {
            account_id,
            direction: EntryDirection::Debit,
            amount_minor,
            description: description.into(),
        }
    }

    /// Creates a credit leg.
    #[must_use]
    pub fn credit(
        account_id: AccountId,
        amount_minor: i64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            direction: EntryDirection::Credit,
            amount_minor,
            description: description.into(),
        }
    }

    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub const fn signed_amount(&self) -> i64 {
        match self.direction {
            EntryDirection::Debit => self.amount_minor,
            EntryDirection::Credit => -self.amount_minor,
        }
    }

    /// Returns the debit amount, or zero for credit legs.
    #[must_use]
    pub const fn debit_minor(&self) -> i64 {
        match self.direction {
            EntryDirection::Debit => self.amount_minor,
            EntryDirection::Credit => 0,
        }
    }

    /// Returns the credit amount, or zero for debit legs.
    #[must_use]
    pub const fn credit_minor(&self) -> i64 {
        match self.direction {
            EntryDirection::Debit => 0,
            EntryDirection::Credit => self.amount_minor,
        }
    }
}

/// Input for posting a balanced set of legs as one transaction.
///
/// All legs share the request currency; the journal rejects any posting
/// that does not net to zero before anything is written.
#[derive(Debug, Clone)]
pub struct PostingRequest {
    /// What kind of money movement this is.
    pub transaction_type: TransactionType,
    /// Identifier of the external object this represents.
    pub reference: String,
    /// The provider this transaction settles with, when applicable.
    pub provider: Option<Provider>,
    /// Natural key for duplicate suppression
    /// (e.g. `"dispute:<id>:freeze"`).
    pub idempotency_key: Option<String>,
    /// Currency shared by every leg.
    pub currency: Currency,
    /// The legs to post (at least one debit and one credit).
    pub legs: Vec<PostingLeg>,
}

/// Totals of a validated posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingTotals {
    /// Sum of debit legs in minor units.
    pub debit_minor: i64,
    /// Sum of credit legs in minor units.
    pub credit_minor: i64,
}

impl PostingTotals {
    /// The amount this posting moves (one side of the balanced pair).
    #[must_use]
    pub const fn total_amount_minor(&self) -> i64 {
        self.debit_minor
    }
}

/// Validates that a posting request is well-formed and balanced.
///
/// Checks, in order:
/// 1. at least one leg
/// 2. every amount positive
/// 3. both a debit and a credit side present
/// 4. signed amounts net to zero
///
/// # Errors
///
/// Returns `LedgerError` if any check fails. Nothing is written on failure.
pub fn validate_posting(request: &PostingRequest) -> Result<PostingTotals, LedgerError> {
    if request.legs.is_empty() {
        return Err(LedgerError::EmptyPosting);
    }

    let mut debit_minor = 0i64;
    let mut credit_minor = 0i64;
    let mut has_debit = false;
    let mut has_credit = false;

    for leg in &request.legs {
        if leg.amount_minor <= 0 {
            return Err(LedgerError::NonPositiveAmount);
        }

        match leg.direction {
            EntryDirection::Debit => {
                debit_minor += leg.amount_minor;
                has_debit = true;
            }
            EntryDirection::Credit => {
                credit_minor += leg.amount_minor;
                has_credit = true;
            }
        }
    }

    if !has_debit || !has_credit {
        return Err(LedgerError::SingleSidedPosting);
    }

    if debit_minor != credit_minor {
        return Err(LedgerError::UnbalancedPosting {
            debits: debit_minor,
            credits: credit_minor,
        });
    }

    Ok(PostingTotals {
        debit_minor,
        credit_minor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_request(legs: Vec<PostingLeg>) -> PostingRequest {
        PostingRequest {
            transaction_type: TransactionType::BookingPayment,
            reference: "ch_123".to_string(),
            provider: Some(Provider::Stripe),
            idempotency_key: None,
            currency: Currency::Usd,
            legs,
        }
    }

    #[test]
    fn test_balanced_posting_accepted() {
        let request = make_request(vec![
            PostingLeg::debit(AccountId::new(), 10_000, "capture"),
            PostingLeg::credit(AccountId::new(), 10_000, "capture"),
        ]);

        let totals = validate_posting(&request).unwrap();
        assert_eq!(totals.debit_minor, 10_000);
        assert_eq!(totals.credit_minor, 10_000);
        assert_eq!(totals.total_amount_minor(), 10_000);
    }

    #[test]
    fn test_multi_leg_posting_accepted() {
        // Capture split across provider earnings and platform fee.
        let request = make_request(vec![
            PostingLeg::debit(AccountId::new(), 100_000, "capture"),
            PostingLeg::credit(AccountId::new(), 97_000, "provider earnings"),
            PostingLeg::credit(AccountId::new(), 3_000, "platform fee"),
        ]);

        let totals = validate_posting(&request).unwrap();
        assert_eq!(totals.total_amount_minor(), 100_000);
    }

    #[test]
    fn test_unbalanced_posting_rejected() {
        let request = make_request(vec![
            PostingLeg::debit(AccountId::new(), 10_000, "capture"),
            PostingLeg::credit(AccountId::new(), 5_000, "capture"),
        ]);

        assert!(matches!(
            validate_posting(&request),
            Err(LedgerError::UnbalancedPosting {
                debits: 10_000,
                credits: 5_000
            })
        ));
    }

    #[test]
    fn test_empty_posting_rejected() {
        let request = make_request(vec![]);
        assert!(matches!(
            validate_posting(&request),
            Err(LedgerError::EmptyPosting)
        ));
    }

    #[test]
    fn test_single_sided_posting_rejected() {
        let request = make_request(vec![
            PostingLeg::debit(AccountId::new(), 5_000, "a"),
            PostingLeg::debit(AccountId::new(), 5_000, "b"),
        ]);
        assert!(matches!(
            validate_posting(&request),
            Err(LedgerError::SingleSidedPosting)
        ));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let request = make_request(vec![
            PostingLeg::debit(AccountId::new(), 0, "a"),
            PostingLeg::credit(AccountId::new(), 0, "b"),
        ]);
        assert!(matches!(
            validate_posting(&request),
            Err(LedgerError::NonPositiveAmount)
        ));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let request = make_request(vec![
            PostingLeg::debit(AccountId::new(), -100, "a"),
            PostingLeg::credit(AccountId::new(), -100, "b"),
        ]);
        assert!(matches!(
            validate_posting(&request),
            Err(LedgerError::NonPositiveAmount)
        ));
    }

    #[test]
    fn test_signed_amount() {
        let debit = PostingLeg::debit(AccountId::new(), 100, "");
        let credit = PostingLeg::credit(AccountId::new(), 100, "");
        assert_eq!(debit.signed_amount(), 100);
        assert_eq!(credit.signed_amount(), -100);
    }
}
