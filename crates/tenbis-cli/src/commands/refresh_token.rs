//! Refresh token command implementation.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use tenbis_core::{ActionKind, ActionReport, ScheduledAction};

use crate::cli::Settings;
use crate::output;
use crate::setup::Runtime;

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(_args: RefreshTokenArgs, settings: &Settings) -> Result<ExitCode> {
    let runtime = Runtime::new(settings)?;
    let ctx = runtime.action_context(runtime.schedule(std::iter::empty()))?;

    let report = ScheduledAction::new(ActionKind::TokenRefresh, ctx)
        .run(chrono::Utc::now())
        .await;

    match &report {
        ActionReport::Completed { updated, .. } if updated.is_empty() => {
            runtime.report("tokens_updated", "false");
            output::warn("Token refresh succeeded but no new tokens were returned");
        }
        ActionReport::Completed { updated, .. } => {
            runtime.report("tokens_updated", "true");
            let fields = updated.iter().map(|f| f.key()).collect::<Vec<_>>();
            output::success("Tokens refreshed");
            output::field("Updated", &fields.join(", "));
        }
        ActionReport::Skipped { weekday } => {
            runtime.report("tokens_updated", "false");
            output::warn(&format!("Skipped: {} is a blocked day", weekday));
        }
        ActionReport::Failed { error, .. } => {
            runtime.report("tokens_updated", "false");
            runtime.report("error", &error.to_string());
            if error.is_auth_error() {
                runtime.report("auth_error", "true");
            }
            output::error(&format!("Token refresh failed: {}", error));
        }
    }

    Ok(ExitCode::from(report.exit_code()))
}
