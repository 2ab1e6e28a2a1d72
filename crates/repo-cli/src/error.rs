//! Error types for repo-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from repo-core
    #[error(transparent)]
    Core(#[from] repo_core::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Log output could not be set up
    #[error("Can't set up logging: {message}")]
    Logging { message: String },
}

impl CliError {
    pub fn logging(message: impl std::fmt::Display) -> Self {
        Self::Logging {
            message: message.to_string(),
        }
    }
}
