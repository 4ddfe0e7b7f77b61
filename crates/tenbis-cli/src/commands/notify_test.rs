//! Notification test command implementation.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use tenbis_core::{ActionKind, Notification, Notifier};

use crate::cli::Settings;
use crate::output;
use crate::setup::Runtime;

#[derive(Args, Debug)]
pub struct NotifyTestArgs {
    /// Amount shown in the test messages
    #[arg(long, default_value = "50")]
    pub amount: String,
}

pub async fn run(args: NotifyTestArgs, settings: &Settings) -> Result<ExitCode> {
    let runtime = Runtime::new(settings)?;
    let notifier = runtime.notifier()?;

    if !notifier.is_configured() {
        output::error(
            "No Teams notifier configured. Set TEAMS_WEBHOOK_URL or the TEAMS_TENANT_ID, \
             TEAMS_CLIENT_ID, TEAMS_CLIENT_SECRET and TEAMS_USER_ID variables",
        );
        return Ok(ExitCode::FAILURE);
    }
    output::field("Notifier", notifier.describe());

    let timestamp = runtime.timestamp(chrono::Utc::now());
    let title = ActionKind::BalanceLoad.title();
    let messages = [
        (
            "success",
            Notification::success(title, Some(args.amount.clone()), timestamp.clone()),
        ),
        (
            "failure",
            Notification::failure(
                title,
                Some(args.amount.clone()),
                timestamp.clone(),
                "Test error: This is just a test message",
                false,
            ),
        ),
    ];

    let mut failed = false;
    for (label, notification) in &messages {
        match notifier.notify(notification).await {
            Ok(()) => output::success(&format!("Sent {} notification", label)),
            Err(e) => {
                failed = true;
                output::error(&format!("Failed to send {} notification: {}", label, e));
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
