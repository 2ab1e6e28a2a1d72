//! Checkout reconciliation for Repository Sync
//!
//! Keeps one local checkout per remote repository on a requested branch,
//! with large-file content pulled and declared. Local state is always
//! discarded in favour of the remote.
//!
//! ```text
//!   job ── retention ── provision ── sync::reconcile ── sync::update ── lfs ── attributes
//! ```
//!
//! - **retention**: counter-driven forced clear of the checkout
//! - **provision**: first clone of `develop`, or hand-off to reconciliation
//! - **sync**: branch state machine and the fetch / pull / large-file update
//! - **lfs** / **attributes**: large-file inventory and declaration checks
//!
//! Every git operation goes through [`repo_git::GitBackend`], so the whole
//! flow runs unchanged against an in-memory backend in tests.

pub mod attributes;
pub mod config;
pub mod error;
pub mod job;
pub mod lfs;
pub mod provision;
pub mod retention;
pub mod sync;

pub use attributes::DeclarationSet;
pub use config::SyncConfig;
pub use error::{Error, Result};
pub use job::{JobReport, SyncJob};
pub use provision::{ProvisionRequest, Provisioned, provision};
pub use retention::{Cleared, REPLENISH, RetentionDecision};
pub use sync::{Reconciliation, reconcile};
