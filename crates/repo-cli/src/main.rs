//! Repository Sync CLI
//!
//! Keeps a local checkout of a remote repository on a requested branch.

mod cli;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;
use repo_core::SyncJob;

use cli::Cli;
use error::Result;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, &cli.log_path()) {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        tracing::error!(critical = true, error = %e, "Sync aborted");
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let job = SyncJob {
        config_path: cli.config,
        repo_url: cli.repo_url,
        branch: cli.branch,
        working_dir: std::env::current_dir()?,
    };

    let report = job.run()?;
    println!(
        "{} {} is on {}",
        "ok".green().bold(),
        report.checkout,
        job.branch.cyan()
    );
    Ok(())
}
