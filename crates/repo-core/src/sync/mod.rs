//! Bringing an existing checkout onto its target branch
//!
//! This module provides:
//! - **executor**: the fetch / pull / large-file update for the checked-out branch
//! - **escalation**: ordered fallback attempts with per-attempt logging
//! - **reconcile**: the branch state machine driving a checkout onto the target branch

mod escalation;
mod executor;
mod reconcile;

pub use escalation::{Escalation, Exhausted, Resolved};
pub use executor::update;
pub use reconcile::{BranchRef, Reconciliation, classify, reconcile};
