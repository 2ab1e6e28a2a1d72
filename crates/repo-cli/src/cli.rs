//! CLI argument parsing using clap derive

use std::path::{Path, PathBuf};

use clap::Parser;

/// File name of the log written next to the settings file.
pub const DEFAULT_LOG_FILE: &str = "repo-sync.log";

/// Repository Sync - keep a local checkout on a branch of a remote repository
///
/// Clones the repository on first use, then hard-resets it onto the remote
/// state of BRANCH on every run. Local changes are discarded.
#[derive(Parser, Debug)]
#[command(name = "repo-sync")]
#[command(author, version, about)]
pub struct Cli {
    /// Remote repository URL (https)
    pub repo_url: String,

    /// Branch the checkout must end up on
    pub branch: String,

    /// Settings file with credentials, checkout root and retention counter
    #[arg(short, long, default_value = "config.json", env = "REPO_SYNC_CONFIG")]
    pub config: PathBuf,

    /// Append log output to this file [default: repo-sync.log next to the settings file]
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn log_path(&self) -> PathBuf {
        match &self.log_file {
            Some(path) => path.clone(),
            None => self
                .config
                .parent()
                .unwrap_or(Path::new(""))
                .join(DEFAULT_LOG_FILE),
        }
    }
}
