//! Error types for repo-core

use std::path::PathBuf;

/// Result type for repo-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while bringing a checkout up to date
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Filesystem error from repo-fs
    #[error(transparent)]
    Fs(#[from] repo_fs::Error),

    /// A version-control command failed
    #[error(transparent)]
    Git(#[from] repo_git::Error),

    /// The checkout tracks large files but has no declarations file
    #[error("Declarations file {} not found but the checkout tracks large files", .path.display())]
    MissingDeclarationsFile { path: PathBuf },

    /// Large files without a matching declaration
    #[error("LFS files not declared in .gitattributes: {}", .files.join(", "))]
    UncoveredLargeFiles { files: Vec<String> },

    /// The fetch / pull / large-file update sequence failed
    #[error("Update failed: {source}")]
    Sync {
        #[source]
        source: Box<Error>,
    },

    /// Every fallback for an operation was exhausted
    #[error("CRITICAL: {operation} failed, administrator intervention required ({})", .attempts.join("; "))]
    CriticalReconciliation {
        operation: String,
        attempts: Vec<String>,
    },

    /// First-time clone failed
    #[error("Error when cloning repository: {source}")]
    Provisioning {
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Build a terminal reconciliation error for a single failed operation.
    pub fn critical(operation: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::CriticalReconciliation {
            operation: operation.into(),
            attempts: vec![cause.to_string()],
        }
    }

    /// The innermost error, looking through `Sync` and `Provisioning`
    /// wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Sync { source } | Self::Provisioning { source } => source.root_cause(),
            other => other,
        }
    }
}
