//! Log output to stdout and an append-only file

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::error::{CliError, Result};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `verbose` when set.
pub fn init(verbose: bool, log_file: &Path) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .map_err(|e| CliError::logging(format!("{}: {e}", log_file.display())))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(verbose))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(CliError::logging)?;

    tracing::debug!(log_file = %log_file.display(), "Verbose mode enabled");
    Ok(())
}
