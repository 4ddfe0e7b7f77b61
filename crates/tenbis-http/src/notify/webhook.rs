//! Teams incoming webhook notifier.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{info, instrument};

use tenbis_core::{Error, Method, Notification, Notifier, RequestDescriptor, Result, Transport};

use super::{SERVICE_URL, amount_text, time_text};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(15);

/// Posts a legacy `MessageCard` to a Teams incoming webhook.
pub struct TeamsWebhookNotifier {
    transport: Arc<dyn Transport>,
    url: url::Url,
}

impl TeamsWebhookNotifier {
    /// # Errors
    ///
    /// Returns an error if `url` is not an absolute URL.
    pub fn new(transport: Arc<dyn Transport>, url: &str) -> Result<Self> {
        let url = url
            .trim()
            .parse::<url::Url>()
            .map_err(|e| Error::InvalidInput(format!("invalid webhook URL: {}", e)))?;
        Ok(Self { transport, url })
    }

    /// The card posted for `notification`.
    pub fn card(notification: &Notification) -> Value {
        let status = notification.status;
        let emoji = if status.is_success() { "✅" } else { "❌" };
        let color = if status.is_success() { "#28a745" } else { "#dc3545" };

        let mut facts = vec![
            json!({ "name": "Amount", "value": amount_text(notification) }),
            json!({ "name": "Time", "value": time_text(notification) }),
            json!({ "name": "Status", "value": status.label() }),
        ];
        if let Some(error) = notification.error_text() {
            facts.push(json!({ "name": "Error", "value": error }));
        }

        json!({
            "@type": "MessageCard",
            "@context": "http://schema.org/extensions",
            "themeColor": color,
            "summary": format!("10bis {}", notification.headline()),
            "sections": [{
                "activityTitle": format!("{} 10bis Bot", emoji),
                "activitySubtitle": notification.headline(),
                "activityImage": format!("{}/favicon.ico", SERVICE_URL),
                "facts": facts,
                "markdown": true
            }],
            "potentialAction": [{
                "@type": "OpenUri",
                "name": "Open 10bis",
                "targets": [{ "os": "default", "uri": SERVICE_URL }]
            }]
        })
    }
}

impl std::fmt::Debug for TeamsWebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The webhook URL embeds its own credential.
        f.debug_struct("TeamsWebhookNotifier")
            .field("host", &self.url.host_str())
            .finish()
    }
}

#[async_trait]
impl Notifier for TeamsWebhookNotifier {
    fn name(&self) -> &'static str {
        "teams-webhook"
    }

    #[instrument(skip(self, notification), fields(status = notification.status.label()))]
    async fn notify(&self, notification: &Notification) -> Result<()> {
        info!("Sending Teams webhook notification");

        let request = RequestDescriptor::new(Method::Post, self.url.clone())
            .header("Content-Type", "application/json")
            .json(Self::card(notification))
            .timeout(WEBHOOK_TIMEOUT);

        let response = self
            .transport
            .send(&request)
            .await
            .map_err(|e| Error::Notification(e.to_string()))?;

        if response.status != 200 {
            return Err(Error::Notification(format!(
                "webhook returned status {}",
                response.status
            )));
        }

        info!("Teams webhook notification sent successfully");
        Ok(())
    }
}
