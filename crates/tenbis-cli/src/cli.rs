//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use tenbis_core::{DEFAULT_API_BASE, DEFAULT_MAX_ATTEMPTS};

use crate::commands::{load_credit, notify_test, refresh_token, status};

/// Scheduled 10bis token refresh and credit loading.
#[derive(Parser, Debug)]
#[command(name = "tenbis")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(clap::Args, Debug, Clone)]
pub struct Settings {
    /// Credential file used when not running under GitHub Actions
    #[arg(long, env = "TENBIS_CONFIG", default_value = "config.json", global = true)]
    pub config: PathBuf,

    /// Directory for log files
    #[arg(long, env = "TENBIS_LOG_DIR", default_value = "logs", global = true)]
    pub log_dir: PathBuf,

    /// Base URL of the 10bis API
    #[arg(long, env = "TENBIS_API_BASE", default_value = DEFAULT_API_BASE, global = true)]
    pub api_base: String,

    /// Attempts per request before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS, global = true)]
    pub max_attempts: u32,

    /// Per-attempt timeout in seconds
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    /// IANA timezone used for blocked days and timestamps
    #[arg(long, default_value = "Asia/Jerusalem", global = true)]
    pub timezone: String,

    /// Teams incoming webhook URL
    #[arg(long, env = "TEAMS_WEBHOOK_URL", hide_env_values = true, global = true)]
    pub webhook_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Exchange the refresh token for new tokens
    RefreshToken(refresh_token::RefreshTokenArgs),

    /// Load the configured amount onto the money card
    LoadCredit(load_credit::LoadCreditArgs),

    /// Show which credentials are configured
    Status(status::StatusArgs),

    /// Send a success and a failure test notification
    NotifyTest(notify_test::NotifyTestArgs),
}

impl Commands {
    /// Log file receiving this command's events.
    pub fn log_file(&self) -> &'static str {
        match self {
            Commands::RefreshToken(_) => "refresh.log",
            Commands::LoadCredit(_) => "credit.log",
            Commands::Status(_) => "general.log",
            Commands::NotifyTest(_) => "notify.log",
        }
    }

    /// Verbosity before any `-v`: index into warn, info, debug, trace.
    pub fn base_verbosity(&self) -> u8 {
        match self {
            Commands::Status(_) => 0,
            _ => 1,
        }
    }
}
