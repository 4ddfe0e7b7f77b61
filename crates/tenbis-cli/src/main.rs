//! tenbis - scheduled 10bis token refresh and credit loading.
//!
//! Each subcommand is one short-lived run meant for cron or a GitHub Actions
//! schedule. The exit code is 0 on success or a skipped day and 1 on failure.

mod cli;
mod commands;
mod logging;
mod notify;
mod output;
mod setup;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use commands::{load_credit, notify_test, refresh_token, status};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let level = logging::level(cli.command.base_verbosity(), cli.verbose);
    let _guards = logging::init(
        level,
        cli.json_logs,
        &cli.settings.log_dir,
        cli.command.log_file(),
    );
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "tenbis starting");

    let settings = &cli.settings;
    match cli.command {
        Commands::RefreshToken(args) => refresh_token::run(args, settings).await,
        Commands::LoadCredit(args) => load_credit::run(args, settings).await,
        Commands::Status(args) => status::run(args, settings).await,
        Commands::NotifyTest(args) => notify_test::run(args, settings).await,
    }
}
