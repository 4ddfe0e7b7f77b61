//! Scheduled actions: token refresh and balance load.
//!
//! One invocation walks `eligibility → load → validate → request → extract →
//! persist → notify`. Any failure short-circuits to a failure notification;
//! a blocked day short-circuits to a skip with no network or disk activity.

use std::sync::Arc;

use chrono::{DateTime, Utc, Weekday};
use tracing::{debug, error, info, instrument, warn};

use crate::api::TenbisApi;
use crate::error::Error;
use crate::retry::ResilientClient;
use crate::schedule::Schedule;
use crate::traits::{CredentialStore, Notification, Notifier};
use crate::types::{CredentialField, CredentialSet, RequestDescriptor, TokenUpdate};
use crate::Result;

/// The two scheduled operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    TokenRefresh,
    BalanceLoad,
}

impl ActionKind {
    /// Title used in banners and notifications.
    pub fn title(self) -> &'static str {
        match self {
            ActionKind::TokenRefresh => "Token Refresh",
            ActionKind::BalanceLoad => "Credit Loading",
        }
    }

    /// Fields that must be non-blank before any request is built.
    pub fn required_fields(self) -> &'static [CredentialField] {
        match self {
            ActionKind::TokenRefresh => &[CredentialField::RefreshToken],
            ActionKind::BalanceLoad => &[
                CredentialField::AccessToken,
                CredentialField::RefreshToken,
                CredentialField::Amount,
                CredentialField::MoneycardId,
            ],
        }
    }

    /// Fields this action accepts from the response.
    pub fn rotated_fields(self) -> &'static [CredentialField] {
        match self {
            ActionKind::TokenRefresh => &[
                CredentialField::AccessToken,
                CredentialField::RefreshToken,
                CredentialField::Amount,
            ],
            ActionKind::BalanceLoad => {
                &[CredentialField::AccessToken, CredentialField::RefreshToken]
            }
        }
    }

    pub fn build_request(
        self,
        api: &TenbisApi,
        credentials: &CredentialSet,
    ) -> Result<RequestDescriptor> {
        match self {
            ActionKind::TokenRefresh => api.refresh_token_request(credentials),
            ActionKind::BalanceLoad => api.load_credit_request(credentials),
        }
    }
}

/// Everything one invocation needs, built once by the caller.
#[derive(Clone)]
pub struct ActionContext {
    pub store: Arc<dyn CredentialStore>,
    pub client: ResilientClient,
    pub api: TenbisApi,
    pub notifier: Arc<dyn Notifier>,
    pub schedule: Schedule,
}

/// Terminal state of one invocation.
#[derive(Debug)]
pub enum ActionReport {
    /// Today is a blocked day; nothing was done.
    Skipped { weekday: Weekday },
    /// The request succeeded.
    Completed {
        status: u16,
        /// Fields persisted from the response (may be empty).
        updated: Vec<CredentialField>,
        amount: Option<String>,
        /// The response carried no body.
        empty_body: bool,
    },
    /// Validation, HTTP or persistence failed.
    Failed {
        error: Error,
        amount: Option<String>,
    },
}

impl ActionReport {
    /// 0 on success or skip, 1 on any failure.
    pub fn exit_code(&self) -> u8 {
        if self.is_failure() { 1 } else { 0 }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ActionReport::Failed { .. })
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            ActionReport::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Orchestrates one scheduled action.
pub struct ScheduledAction {
    kind: ActionKind,
    ctx: ActionContext,
}

struct Completion {
    status: u16,
    updated: Vec<CredentialField>,
    empty_body: bool,
}

impl ScheduledAction {
    pub fn new(kind: ActionKind, ctx: ActionContext) -> Self {
        Self { kind, ctx }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Run the action to completion as of `now`.
    ///
    /// Never returns an error; failures are reported through
    /// [`ActionReport::Failed`] after the failure notification was attempted.
    #[instrument(skip(self, now), fields(action = self.kind.title()))]
    pub async fn run(&self, now: DateTime<Utc>) -> ActionReport {
        let title = self.kind.title();
        let timestamp = self.ctx.schedule.format_local(now);
        info!("=== {} Started at {} ===", title, timestamp);

        if let Some(weekday) = self.ctx.schedule.blocked_day(now) {
            info!(
                %weekday,
                "Skipping {} - today is a blocked day",
                title.to_lowercase()
            );
            return ActionReport::Skipped { weekday };
        }

        let mut amount = None;
        match self.execute(&mut amount).await {
            Ok(done) => {
                let notification = Notification::success(title, amount.clone(), timestamp.clone());
                self.deliver(&notification).await;
                info!("=== {} Completed at {} ===", title, timestamp);
                ActionReport::Completed {
                    status: done.status,
                    updated: done.updated,
                    amount,
                    empty_body: done.empty_body,
                }
            }
            Err(err) => {
                let auth_error = err.is_auth_error();
                error!(error = %err, kind = err.kind(), "{} failed", title);
                if auth_error {
                    warn!("Authentication error detected - tokens may need refresh");
                }

                let notification = Notification::failure(
                    title,
                    amount.clone(),
                    timestamp.clone(),
                    err.to_string(),
                    auth_error,
                );
                self.deliver(&notification).await;
                error!("=== {} Failed at {}: {} ===", title, timestamp, err);
                ActionReport::Failed { error: err, amount }
            }
        }
    }

    async fn execute(&self, amount: &mut Option<String>) -> Result<Completion> {
        info!(source = %self.ctx.store.describe(), "Loading configuration");
        let credentials = self.ctx.store.load()?;
        *amount = credentials.field(CredentialField::Amount);

        credentials.validate(self.kind.required_fields())?;

        let request = self.kind.build_request(&self.ctx.api, &credentials)?;
        if self.kind == ActionKind::BalanceLoad {
            info!(
                amount = amount.as_deref().unwrap_or_default(),
                moneycard_id = credentials
                    .field(CredentialField::MoneycardId)
                    .as_deref()
                    .unwrap_or_default(),
                "Attempting to load credit"
            );
        }

        let response = self.ctx.client.execute(&request).await?;
        info!(status = response.status, "{} API responded", self.kind.title());
        let empty_body = response.body.trim().is_empty();

        if self.kind == ActionKind::BalanceLoad {
            match response.status {
                _ if empty_body => info!("Credit loading completed - no response data"),
                200 | 201 => info!("Credit loaded successfully"),
                status => warn!(status, "Unexpected response status from credit loading"),
            }
            debug!(body_len = response.body.len(), "Credit loading response received");
        }

        let mut update = TokenUpdate::from_response(&response);
        update.restrict(self.kind.rotated_fields());

        if update.is_empty() {
            if self.kind == ActionKind::TokenRefresh {
                warn!("No token updates received from API (neither headers nor body)");
                warn!("This might indicate the refresh token is invalid or expired");
            } else {
                debug!("No rotated credentials in response");
            }
            return Ok(Completion {
                status: response.status,
                updated: Vec::new(),
                empty_body,
            });
        }

        for field in update.fields() {
            if let Some(source) = update.source(field) {
                info!(%field, %source, "New {} received", field);
            }
        }
        info!(
            headers = update.header_count(),
            body = update.body_count(),
            "Tokens extracted"
        );
        let changed = update.changed_fields(&credentials);
        for field in update.fields() {
            debug!(%field, changed = changed.contains(&field), "Rotation check");
        }

        let updated = update.fields();
        self.ctx.store.save(update.credentials())?;

        info!(
            fields = %updated
                .iter()
                .map(|f| f.key())
                .collect::<Vec<_>>()
                .join(", "),
            "{} completed successfully",
            self.kind.title()
        );

        Ok(Completion {
            status: response.status,
            updated,
            empty_body,
        })
    }

    /// Deliver a notification; failures are logged and swallowed.
    async fn deliver(&self, notification: &Notification) {
        let notifier = &self.ctx.notifier;
        match notifier.notify(notification).await {
            Ok(()) => debug!(notifier = notifier.name(), "Notification delivered"),
            Err(e) => warn!(
                notifier = notifier.name(),
                error = %e,
                "Failed to send notification"
            ),
        }
    }
}
