//! Error types for repo-git

use std::path::PathBuf;

/// Result type for repo-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in repo-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A git command ran and exited unsuccessfully
    #[error("`{command}` failed ({}): {stderr}", describe_code(*code))]
    ToolInvocation {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A git command could not be started at all
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("Unsupported remote URL '{url}': only http(s) remotes can carry credentials")]
    InvalidRemoteUrl { url: String },
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}
