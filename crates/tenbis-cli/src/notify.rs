//! Teams notifier selection and step output reporting.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use tenbis_core::{
    CredentialField, CredentialStore, Notification, Notifier, Result, Secret, Transport,
};
use tenbis_http::{GraphChatNotifier, GraphConfig, TeamsWebhookNotifier};
use tenbis_store::ActionsOutput;

const GRAPH_VARS: [&str; 4] = [
    "TEAMS_TENANT_ID",
    "TEAMS_CLIENT_ID",
    "TEAMS_CLIENT_SECRET",
    "TEAMS_USER_ID",
];

enum Target {
    Graph(GraphChatNotifier),
    Webhook(TeamsWebhookNotifier),
    /// Webhook URL read from the credential set when a message is sent.
    FromStore,
}

/// Delivers through Graph or a webhook, whichever is configured, and
/// reports `teams_notification` / `teams_error` step outputs.
pub struct TeamsNotifier {
    target: Target,
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    output: ActionsOutput,
}

/// Graph credentials from the environment, if all four are set.
pub fn graph_config_from_env(output: &ActionsOutput) -> Option<GraphConfig> {
    graph_config(|name| std::env::var(name).ok(), output)
}

/// Graph credentials from `lookup`; the client secret is masked on `output`.
fn graph_config(
    lookup: impl Fn(&str) -> Option<String>,
    output: &ActionsOutput,
) -> Option<GraphConfig> {
    let [tenant_id, client_id, client_secret, user_id] =
        GRAPH_VARS.map(|name| lookup(name).filter(|value| !value.trim().is_empty()));

    if let Some(secret) = &client_secret {
        output.mask(secret);
    }

    Some(GraphConfig {
        tenant_id: tenant_id?,
        client_id: client_id?,
        client_secret: Secret::new(client_secret?),
        user_id: user_id?,
    })
}

impl TeamsNotifier {
    /// Prefer Graph, then an explicit webhook URL, then the credential set.
    ///
    /// # Errors
    ///
    /// Returns an error if `webhook_url` is not a valid URL.
    pub fn resolve(
        graph: Option<GraphConfig>,
        webhook_url: Option<&str>,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
        output: ActionsOutput,
    ) -> Result<Self> {
        let target = match (graph, webhook_url.filter(|url| !url.trim().is_empty())) {
            (Some(config), _) => Target::Graph(GraphChatNotifier::new(transport.clone(), config)),
            (None, Some(url)) => Target::Webhook(TeamsWebhookNotifier::new(transport.clone(), url)?),
            (None, None) => Target::FromStore,
        };

        Ok(Self {
            target,
            transport,
            store,
            output,
        })
    }

    /// Short description for status output.
    pub fn describe(&self) -> &'static str {
        match self.target {
            Target::Graph(_) => "Teams chat (Microsoft Graph)",
            Target::Webhook(_) => "Teams webhook",
            Target::FromStore => "Teams webhook from credentials",
        }
    }

    fn stored_webhook(&self) -> Option<String> {
        self.store
            .load()
            .ok()
            .and_then(|credentials| credentials.field(CredentialField::TeamsWebhookUrl))
    }

    /// Whether a message would actually be sent.
    pub fn is_configured(&self) -> bool {
        match self.target {
            Target::FromStore => self.stored_webhook().is_some(),
            _ => true,
        }
    }

    /// Send and return the step output label, or `None` if nothing is configured.
    async fn dispatch(&self, notification: &Notification) -> Result<Option<&'static str>> {
        match &self.target {
            Target::Graph(graph) => graph.notify(notification).await.map(|_| Some("sent")),
            Target::Webhook(webhook) => webhook
                .notify(notification)
                .await
                .map(|_| Some("sent_webhook")),
            Target::FromStore => match self.stored_webhook() {
                Some(url) => TeamsWebhookNotifier::new(self.transport.clone(), &url)?
                    .notify(notification)
                    .await
                    .map(|_| Some("sent_webhook")),
                None => {
                    info!("Teams webhook URL not configured - skipping notification");
                    Ok(None)
                }
            },
        }
    }

    fn report(&self, name: &str, value: &str) {
        if let Err(e) = self.output.set_output(name, value) {
            warn!(output = name, error = %e, "Failed to set step output");
        }
    }
}

#[async_trait]
impl Notifier for TeamsNotifier {
    fn name(&self) -> &'static str {
        match self.target {
            Target::Graph(_) => "teams-graph",
            _ => "teams-webhook",
        }
    }

    async fn notify(&self, notification: &Notification) -> Result<()> {
        match self.dispatch(notification).await {
            Ok(Some(label)) => {
                self.report("teams_notification", label);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                self.report("teams_notification", "failed");
                self.report("teams_error", &e.to_string());
                Err(e)
            }
        }
    }
}
