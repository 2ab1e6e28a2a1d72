//! Git capability layer for Repository Sync
//!
//! Exposes exactly the version-control operations the reconciliation layer
//! needs through [`GitBackend`], plus the naming and remote-URL helpers used
//! to locate and authenticate a checkout.

pub mod command;
pub mod error;
pub mod helpers;
pub mod naming;
pub mod provider;
pub mod remote;

pub use command::CommandGit;
pub use error::{Error, Result};
pub use naming::repo_folder_name;
pub use provider::{BASE_BRANCH, CleanMode, DEFAULT_REMOTE, GcMode, GitBackend};
pub use remote::{Credentials, authenticated_url, redact_credentials};
