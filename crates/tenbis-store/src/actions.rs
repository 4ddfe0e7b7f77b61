//! GitHub Actions workflow command channel.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;
use uuid::Uuid;

use tenbis_core::{Error, Result};

/// Step outputs and secret masks for a GitHub Actions runner.
///
/// Outputs are appended to the `$GITHUB_OUTPUT` file when the runner
/// provides one, and fall back to the legacy `::set-output` command.
/// Outside of Actions every call is a no-op.
#[derive(Clone)]
pub struct ActionsOutput {
    enabled: bool,
    output_file: Option<PathBuf>,
    commands: Arc<Mutex<dyn Write + Send>>,
}

impl ActionsOutput {
    /// Detect the runner from `GITHUB_ACTIONS` / `GITHUB_OUTPUT`.
    pub fn from_env() -> Self {
        let enabled = std::env::var_os("GITHUB_ACTIONS").is_some();
        let output_file = std::env::var_os("GITHUB_OUTPUT")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self {
            enabled,
            output_file,
            commands: Arc::new(Mutex::new(io::stdout())),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            output_file: None,
            commands: Arc::new(Mutex::new(io::sink())),
        }
    }

    /// An enabled channel writing commands to `commands`.
    pub fn new(output_file: Option<PathBuf>, commands: impl Write + Send + 'static) -> Self {
        Self {
            enabled: true,
            output_file,
            commands: Arc::new(Mutex::new(commands)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Ask the runner to redact `value` from all further log output.
    pub fn mask(&self, value: &str) {
        if !self.enabled || value.is_empty() {
            return;
        }
        // The runner reads commands line by line.
        for line in value.lines().filter(|l| !l.is_empty()) {
            self.command(&format!("::add-mask::{}", line));
        }
    }

    /// Report a step output.
    ///
    /// # Errors
    ///
    /// Returns an error if the output file cannot be appended to.
    pub fn set_output(&self, name: &str, value: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        match &self.output_file {
            Some(path) => append_output(path, name, value),
            None => {
                self.command(&format!("::set-output name={}::{}", name, value));
                Ok(())
            }
        }
    }

    fn command(&self, line: &str) {
        let Ok(mut out) = self.commands.lock() else {
            return;
        };
        if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            debug!(error = %e, "Failed to write workflow command");
        }
    }
}

fn append_output(path: &Path, name: &str, value: &str) -> Result<()> {
    let entry = if value.contains('\n') {
        let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
        format!("{}<<{}\n{}\n{}\n", name, delimiter, value, delimiter)
    } else {
        format!("{}={}\n", name, value)
    };

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(entry.as_bytes()))
        .map_err(|e| {
            Error::Persistence(format!(
                "failed to write step output to {}: {}",
                path.display(),
                e
            ))
        })
}

impl std::fmt::Debug for ActionsOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionsOutput")
            .field("enabled", &self.enabled)
            .field("output_file", &self.output_file)
            .finish()
    }
}
