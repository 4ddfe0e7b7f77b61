//! Direct chat messages through Microsoft Graph.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use tenbis_core::{
    Error, HttpResponse, Method, Notification, Notifier, RequestDescriptor, Result, Secret,
    Transport,
};

use super::{amount_text, time_text};

const LOGIN_BASE: &str = "https://login.microsoftonline.com";
const GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";
const MESSAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Azure AD application allowed to message a user.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: Secret,
    /// Object id or UPN of the user receiving the message.
    pub user_id: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    id: String,
}

/// Sends each notification as a one-on-one Teams chat message.
///
/// Uses the client credentials grant; the token is cached for the
/// lifetime of the notifier.
pub struct GraphChatNotifier {
    transport: Arc<dyn Transport>,
    config: GraphConfig,
    login_base: String,
    graph_base: String,
    token: Mutex<Option<Secret>>,
}

impl GraphChatNotifier {
    pub fn new(transport: Arc<dyn Transport>, config: GraphConfig) -> Self {
        Self {
            transport,
            config,
            login_base: LOGIN_BASE.to_string(),
            graph_base: GRAPH_BASE.to_string(),
            token: Mutex::new(None),
        }
    }

    /// Point the notifier at other login and Graph hosts.
    pub fn with_endpoints(mut self, login_base: &str, graph_base: &str) -> Self {
        self.login_base = login_base.trim_end_matches('/').to_string();
        self.graph_base = graph_base.trim_end_matches('/').to_string();
        self
    }

    /// HTML body of the chat message.
    pub fn html(notification: &Notification) -> String {
        let status = notification.status;
        let emoji = if status.is_success() { "✅" } else { "❌" };
        let color = if status.is_success() { "#00FF00" } else { "#FF0000" };

        let mut items = vec![
            format!("<li><strong>Amount:</strong> {}</li>", escape(&amount_text(notification))),
            format!("<li><strong>Time:</strong> {}</li>", escape(&time_text(notification))),
            format!("<li><strong>Status:</strong> {}</li>", status.label()),
        ];
        if let Some(error) = notification.error_text() {
            items.push(format!("<li><strong>Error:</strong> {}</li>", escape(&error)));
        }

        format!(
            concat!(
                "<div style=\"border-left: 4px solid {color}; padding-left: 12px; margin: 8px 0;\">",
                "<h3 style=\"margin: 0; color: {color};\">{emoji} 10bis Bot</h3>",
                "<p style=\"margin: 4px 0; font-size: 14px;\"><strong>{headline}</strong></p>",
                "<ul style=\"margin: 8px 0; padding-left: 20px; font-size: 13px;\">{items}</ul>",
                "</div>"
            ),
            color = color,
            emoji = emoji,
            headline = escape(&notification.headline()),
            items = items.concat(),
        )
    }

    async fn access_token(&self) -> Result<Secret> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let url = format!("{}/{}/oauth2/v2.0/token", self.login_base, self.config.tenant_id);
        let request = RequestDescriptor::parse(Method::Post, &url)?.form(vec![
            ("client_id".into(), self.config.client_id.clone()),
            ("client_secret".into(), self.config.client_secret.expose().to_string()),
            ("scope".into(), GRAPH_SCOPE.into()),
            ("grant_type".into(), "client_credentials".into()),
        ]);

        let response = self.send(&request, "token request").await?;
        let token: TokenResponse = parse(&response, "token response")?;
        info!("Microsoft Graph access token obtained");

        let token = Secret::new(token.access_token);
        *cached = Some(token.clone());
        Ok(token)
    }

    async fn open_chat(&self, token: &Secret) -> Result<String> {
        let request = RequestDescriptor::parse(Method::Post, &format!("{}/chats", self.graph_base))?
            .header("Authorization", format!("Bearer {}", token.expose()))
            .json(json!({
                "chatType": "oneOnOne",
                "members": [{
                    "@odata.type": "#microsoft.graph.aadUserConversationMember",
                    "roles": ["owner"],
                    "user@odata.bind": format!("{}/users('{}')", GRAPH_BASE, self.config.user_id)
                }]
            }));

        let response = self.send(&request, "chat creation").await?;
        let chat: ChatResponse = parse(&response, "chat response")?;
        debug!(chat_id = %chat.id, "Chat ready");
        Ok(chat.id)
    }

    async fn send(&self, request: &RequestDescriptor, what: &str) -> Result<HttpResponse> {
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| Error::Notification(format!("{} failed: {}", what, e)))?;

        if !(200..300).contains(&response.status) {
            return Err(Error::Notification(format!(
                "{} returned status {}",
                what, response.status
            )));
        }
        Ok(response)
    }
}

fn parse<T: for<'de> Deserialize<'de>>(response: &HttpResponse, what: &str) -> Result<T> {
    serde_json::from_str(&response.body)
        .map_err(|e| Error::Notification(format!("invalid {}: {}", what, e)))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl std::fmt::Debug for GraphChatNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphChatNotifier")
            .field("config", &self.config)
            .field("login_base", &self.login_base)
            .field("graph_base", &self.graph_base)
            .finish()
    }
}

#[async_trait]
impl Notifier for GraphChatNotifier {
    fn name(&self) -> &'static str {
        "teams-graph"
    }

    #[instrument(skip(self, notification), fields(status = notification.status.label()))]
    async fn notify(&self, notification: &Notification) -> Result<()> {
        let token = self.access_token().await?;
        info!("Sending Teams direct message");
        let chat_id = self.open_chat(&token).await?;

        let url = format!("{}/chats/{}/messages", self.graph_base, chat_id);
        let request = RequestDescriptor::parse(Method::Post, &url)?
            .header("Authorization", format!("Bearer {}", token.expose()))
            .json(json!({
                "body": { "contentType": "html", "content": Self::html(notification) }
            }))
            .timeout(MESSAGE_TIMEOUT);

        let response = self.send(&request, "message delivery").await?;
        if response.status != 201 {
            return Err(Error::Notification(format!(
                "message delivery returned status {}",
                response.status
            )));
        }

        info!("Teams direct message sent successfully");
        Ok(())
    }
}
