//! Filesystem helpers for Repository Sync
//!
//! Provides normalized paths, atomic I/O, JSON configuration storage and
//! the checkout-folder helpers used by the reconciliation layer.

pub mod config;
pub mod constants;
pub mod dir;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::RepoPath;
pub use error::{Error, Result};
pub use path::NormalizedPath;
