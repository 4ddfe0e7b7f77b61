//! Microsoft Teams notifiers.

pub mod graph;
pub mod webhook;

use tenbis_core::Notification;

/// Linked from every message.
const SERVICE_URL: &str = "https://www.10bis.co.il";

fn amount_text(notification: &Notification) -> String {
    format!("₪{}", notification.amount.as_deref().unwrap_or("N/A"))
}

fn time_text(notification: &Notification) -> String {
    format!("{} (Israel Time)", notification.timestamp)
}
