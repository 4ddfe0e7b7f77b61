//! Wiring of stores, transport and notifier from CLI settings.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc, Weekday};
use chrono_tz::Tz;
use tracing::debug;

use tenbis_core::schedule::parse_timezone;
use tenbis_core::{
    ActionContext, CredentialStore, ResilientClient, Schedule, TenbisApi, Transport,
};
use tenbis_http::ReqwestTransport;
use tenbis_store::{ActionsOutput, EnvCredentialStore, FileCredentialStore};

use crate::cli::Settings;
use crate::notify::{TeamsNotifier, graph_config_from_env};

/// Shared collaborators for one command invocation.
pub struct Runtime {
    pub settings: Settings,
    pub store: Arc<dyn CredentialStore>,
    pub output: ActionsOutput,
    pub transport: Arc<dyn Transport>,
    pub timezone: Tz,
}

impl Runtime {
    /// Select the credential store and build the HTTP transport.
    ///
    /// Credentials come from the environment on a GitHub Actions runner or
    /// whenever `ACCESS_TOKEN` is exported, and from the config file otherwise.
    pub fn new(settings: &Settings) -> Result<Self> {
        let timezone = parse_timezone(&settings.timezone).context("Invalid --timezone")?;
        let output = ActionsOutput::from_env();

        let store: Arc<dyn CredentialStore> = if EnvCredentialStore::is_selected() {
            Arc::new(EnvCredentialStore::from_env().with_output(output.clone()))
        } else {
            Arc::new(FileCredentialStore::new(&settings.config))
        };
        debug!(store = %store.describe(), "Credential store selected");

        let transport: Arc<dyn Transport> =
            Arc::new(ReqwestTransport::new().context("Failed to build HTTP client")?);

        Ok(Self {
            settings: settings.clone(),
            store,
            output,
            transport,
            timezone,
        })
    }

    pub fn schedule(&self, blocked: impl IntoIterator<Item = Weekday>) -> Schedule {
        Schedule::blocked_on(blocked).with_timezone(self.timezone)
    }

    /// Local time of `now`, formatted for messages.
    pub fn timestamp(&self, now: DateTime<Utc>) -> String {
        Schedule::always()
            .with_timezone(self.timezone)
            .format_local(now)
    }

    pub fn notifier(&self) -> Result<TeamsNotifier> {
        TeamsNotifier::resolve(
            graph_config_from_env(&self.output),
            self.settings.webhook_url.as_deref(),
            self.transport.clone(),
            self.store.clone(),
            self.output.clone(),
        )
        .context("Invalid Teams webhook URL")
    }

    /// Everything a scheduled action needs.
    pub fn action_context(&self, schedule: Schedule) -> Result<ActionContext> {
        let api = TenbisApi::new(&self.settings.api_base)
            .context("Invalid --api-base")?
            .with_timeout(Duration::from_secs(self.settings.timeout_secs));

        Ok(ActionContext {
            store: self.store.clone(),
            client: ResilientClient::from_arc(self.transport.clone())
                .with_max_attempts(self.settings.max_attempts),
            api,
            notifier: Arc::new(self.notifier()?),
            schedule,
        })
    }

    /// Set a step output, logging instead of failing.
    pub fn report(&self, name: &str, value: &str) {
        if let Err(e) = self.output.set_output(name, value) {
            tracing::warn!(output = name, error = %e, "Failed to set step output");
        }
    }
}
