//! Environment variable backed credential store.

use std::collections::BTreeMap;
use std::sync::Mutex;

use tracing::{info, instrument, warn};

use tenbis_core::{CredentialField, CredentialSet, CredentialStore, Error, Result};

use crate::ActionsOutput;

/// Credentials read from process environment variables.
///
/// The environment cannot be written back from inside a run, so `save`
/// keeps the merged set in memory and reports each updated field as a
/// masked workflow step output for a later step to persist.
pub struct EnvCredentialStore {
    vars: BTreeMap<CredentialField, String>,
    overrides: Mutex<CredentialSet>,
    output: ActionsOutput,
}

impl EnvCredentialStore {
    /// Read every credential variable from the current process.
    pub fn from_env() -> Self {
        Self::from_vars(
            CredentialField::ALL
                .iter()
                .filter_map(|field| std::env::var(field.env_var()).ok().map(|v| (*field, v))),
        )
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (CredentialField, String)>) -> Self {
        Self {
            vars: vars.into_iter().filter(|(_, v)| !v.trim().is_empty()).collect(),
            overrides: Mutex::new(CredentialSet::new()),
            output: ActionsOutput::disabled(),
        }
    }

    /// Report saves through `output`.
    ///
    /// Every secret read from the environment is masked on `output` at once.
    pub fn with_output(mut self, output: ActionsOutput) -> Self {
        for (field, value) in &self.vars {
            if field.is_secret() {
                output.mask(value);
            }
        }
        self.output = output;
        self
    }

    /// Whether credentials should come from the environment instead of a file.
    ///
    /// True on a GitHub Actions runner or whenever an access token is exported.
    pub fn is_selected() -> bool {
        std::env::var_os("GITHUB_ACTIONS").is_some()
            || std::env::var(CredentialField::AccessToken.env_var())
                .is_ok_and(|v| !v.trim().is_empty())
    }

    fn base(&self) -> CredentialSet {
        self.vars
            .iter()
            .fold(CredentialSet::new(), |set, (field, value)| {
                set.with(field.key(), value.as_str())
            })
    }
}

impl std::fmt::Debug for EnvCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvCredentialStore")
            .field("fields", &self.vars.keys().collect::<Vec<_>>())
            .field("output", &self.output)
            .finish()
    }
}

impl CredentialStore for EnvCredentialStore {
    fn describe(&self) -> String {
        "environment variables".to_string()
    }

    #[instrument(skip(self))]
    fn load(&self) -> Result<CredentialSet> {
        if self.vars.is_empty() {
            return Err(Error::ConfigurationMissing {
                source_hint: format!(
                    "no credential environment variables set (expected {})",
                    CredentialField::ALL
                        .iter()
                        .map(|f| f.env_var())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            });
        }

        let overrides = self
            .overrides
            .lock()
            .map_err(|_| Error::Persistence("credential overrides poisoned".to_string()))?;
        Ok(self.base().merged(&overrides))
    }

    #[instrument(skip(self, updates))]
    fn save(&self, updates: &CredentialSet) -> Result<CredentialSet> {
        let merged = {
            let mut overrides = self
                .overrides
                .lock()
                .map_err(|_| Error::Persistence("credential overrides poisoned".to_string()))?;
            *overrides = overrides.merged(updates);
            self.base().merged(&overrides)
        };

        let mut reported = Vec::new();
        for key in updates.keys() {
            let Some(value) = updates.get(key) else {
                continue;
            };
            let name = match key.parse::<CredentialField>() {
                Ok(field) => {
                    if field.is_secret() {
                        self.output.mask(&value);
                    }
                    field.output_name().to_string()
                }
                Err(_) => {
                    self.output.mask(&value);
                    key.to_string()
                }
            };
            if let Err(e) = self.output.set_output(&name, &value) {
                warn!(output = %name, error = %e, "Failed to report updated value");
                return Err(e);
            }
            reported.push(name);
        }

        if !self.output.is_enabled() {
            warn!("Updated values are only held in memory; persist them before the next run");
        }
        info!(
            outputs = %reported.join(", "),
            "Tokens updated for GitHub Actions"
        );
        Ok(merged)
    }
}
