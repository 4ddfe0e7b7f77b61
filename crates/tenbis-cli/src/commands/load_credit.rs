//! Load credit command implementation.

use std::process::ExitCode;

use anyhow::Result;
use chrono::Weekday;
use clap::Args;

use tenbis_core::schedule::parse_weekday;
use tenbis_core::{ActionKind, ActionReport, ScheduledAction};

use crate::cli::Settings;
use crate::output;
use crate::setup::Runtime;

#[derive(Args, Debug)]
pub struct LoadCreditArgs {
    /// Validate the configuration and exit without loading credit
    #[arg(long)]
    pub check: bool,

    /// Comma-separated local weekdays on which loading is skipped; empty for none
    #[arg(long, default_value = "fri,sat", value_parser = parse_days)]
    pub blocked_days: BlockedDays,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockedDays(pub Vec<Weekday>);

fn parse_days(s: &str) -> std::result::Result<BlockedDays, String> {
    s.split(',')
        .map(str::trim)
        .filter(|day| !day.is_empty())
        .map(|day| parse_weekday(day).map_err(|e| e.to_string()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(BlockedDays)
}

pub async fn run(args: LoadCreditArgs, settings: &Settings) -> Result<ExitCode> {
    let runtime = Runtime::new(settings)?;

    if args.check {
        return Ok(check(&runtime));
    }

    let ctx = runtime.action_context(runtime.schedule(args.blocked_days.0))?;
    let report = ScheduledAction::new(ActionKind::BalanceLoad, ctx)
        .run(chrono::Utc::now())
        .await;

    match &report {
        ActionReport::Skipped { weekday } => {
            runtime.report("credit_loaded", "skipped_weekend");
            output::warn(&format!(
                "Skipped: credit loading is not available on {}",
                weekday
            ));
        }
        ActionReport::Completed {
            empty_body: true, ..
        } => {
            runtime.report("credit_loaded", "no_response_data");
            output::warn("Credit loading completed without response data");
        }
        ActionReport::Completed { status, amount, .. } if matches!(status, 200 | 201) => {
            let amount = amount.as_deref().unwrap_or_default();
            runtime.report("credit_loaded", "success");
            runtime.report("amount_loaded", amount);
            output::success("Credit loaded");
            output::field("Amount", amount);
        }
        ActionReport::Completed { status, .. } => {
            runtime.report("credit_loaded", "unexpected_status");
            runtime.report("response_status", &status.to_string());
            output::warn(&format!("Credit loading returned unexpected status {}", status));
        }
        ActionReport::Failed { error, .. } => {
            runtime.report("credit_loaded", "failed");
            runtime.report("error", &error.to_string());
            if error.is_auth_error() {
                runtime.report("auth_error", "true");
            }
            output::error(&format!("Credit loading failed: {}", error));
        }
    }

    Ok(ExitCode::from(report.exit_code()))
}

/// Validate the configuration without any network call.
fn check(runtime: &Runtime) -> ExitCode {
    output::field("Source", &runtime.store.describe());

    let result = runtime.store.load().and_then(|credentials| {
        for field in ActionKind::BalanceLoad.required_fields() {
            let value = credentials.field(*field);
            let shown = match (&value, field.is_secret()) {
                (None, _) => "missing".to_string(),
                (Some(_), true) => "present".to_string(),
                (Some(v), false) => v.clone(),
            };
            output::field(field.key(), &shown);
        }
        credentials.validate(ActionKind::BalanceLoad.required_fields())
    });

    match result {
        Ok(()) => {
            runtime.report("config_test", "passed");
            output::success("Configuration is valid");
            ExitCode::SUCCESS
        }
        Err(e) => {
            runtime.report("config_test", "failed");
            runtime.report("config_error", &e.to_string());
            output::error(&format!("Configuration check failed: {}", e));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_day_lists() {
        assert_eq!(
            parse_days("fri, Saturday"),
            Ok(BlockedDays(vec![Weekday::Fri, Weekday::Sat]))
        );
        assert_eq!(parse_days(""), Ok(BlockedDays(Vec::new())));
        assert!(parse_days("fri,funday").is_err());
    }
}
