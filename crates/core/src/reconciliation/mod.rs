//! Provider statement reconciliation.
//!
//! This module implements the deterministic diff between our transaction
//! journal and a provider-reported statement for the same window:
//! - Record types for both sides
//! - Discrepancy classification (kind + severity)
//! - The pure key-based matcher

pub mod matcher;
pub mod types;

#[cfg(test)]
mod matcher_props;

pub use matcher::{classify, MatchConfig};
pub use types::{
    Discrepancy, DiscrepancyKind, InternalTransaction, JobStatus, ProviderTransaction,
    ReconciliationJob, Severity,
};
