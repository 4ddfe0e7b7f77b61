//! Status command implementation.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use tenbis_core::CredentialField;

use crate::cli::Settings;
use crate::output;
use crate::setup::Runtime;

#[derive(Args, Debug)]
pub struct StatusArgs {}

pub async fn run(_args: StatusArgs, settings: &Settings) -> Result<ExitCode> {
    let runtime = Runtime::new(settings)?;

    output::field("Source", &runtime.store.describe());
    output::field("Notifier", runtime.notifier()?.describe());
    output::field("Local time", &runtime.timestamp(chrono::Utc::now()));

    let credentials = runtime
        .store
        .load()
        .context("Failed to load configuration")?;

    output::heading("Credentials");
    for field in CredentialField::ALL {
        let shown = if field.is_secret() {
            credentials
                .secret(field)
                .map(|secret| secret.masked())
                .unwrap_or_else(|| "missing".to_string())
        } else {
            credentials
                .field(field)
                .unwrap_or_else(|| "missing".to_string())
        };
        output::field(field.key(), &shown);
    }

    Ok(ExitCode::SUCCESS)
}
