//! Ledger integrity checks.
//!
//! Four independent checks, each re-deriving state from the entries and
//! comparing it against what is stored. Verification is read-only: it
//! reports, it never repairs.

pub mod checks;
pub mod types;

pub use checks::{
    check_account_balances, check_global_balance, check_orphan_entries,
    check_transaction_consistency,
};
pub use types::{CheckFailure, CheckKind, VerificationResult};
