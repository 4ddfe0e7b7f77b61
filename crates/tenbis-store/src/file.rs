//! JSON file backed credential store.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use tenbis_core::{CredentialSet, CredentialStore, Error, Result};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

fn persistence(action: &str, path: &Path, err: std::io::Error) -> Error {
    Error::Persistence(format!("{} {}: {}", action, path.display(), err))
}

/// Credential set stored as a pretty-printed JSON object.
///
/// Every save copies the current file to `<file>.backup` first and then
/// replaces the file through a temporary sibling, so an interrupted save
/// leaves either the old or the new version in place.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the copy taken before each overwrite.
    pub fn backup_path(&self) -> PathBuf {
        sibling(&self.path, "backup")
    }

    fn temp_path(&self) -> PathBuf {
        sibling(&self.path, "tmp")
    }

    fn read(&self) -> Result<Option<CredentialSet>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)
            .map_err(|e| persistence("failed to read", &self.path, e))?;
        let value: serde_json::Value = serde_json::from_str(&json).map_err(|e| {
            Error::InvalidInput(format!("invalid config file {}: {}", self.path.display(), e))
        })?;

        CredentialSet::from_json(value).map(Some)
    }

    fn backup(&self) -> Result<()> {
        let backup = self.backup_path();
        fs::copy(&self.path, &backup).map_err(|e| persistence("failed to back up to", &backup, e))?;
        debug!(backup = %backup.display(), "Configuration backed up");
        Ok(())
    }

    fn write(&self, credentials: &CredentialSet) -> Result<()> {
        let json = serde_json::to_string_pretty(credentials)
            .map_err(|e| Error::InvalidInput(format!("failed to serialize config: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| persistence("failed to create", parent, e))?;
        }

        let temp = self.temp_path();
        {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&temp)
                .map_err(|e| persistence("failed to open", &temp, e))?;
            file.write_all(json.as_bytes())
                .and_then(|_| file.write_all(b"\n"))
                .and_then(|_| file.sync_all())
                .map_err(|e| persistence("failed to write", &temp, e))?;
        }

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&temp)
                .map_err(|e| persistence("failed to stat", &temp, e))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&temp, perms)
                .map_err(|e| persistence("failed to restrict", &temp, e))?;
        }

        fs::rename(&temp, &self.path).map_err(|e| persistence("failed to replace", &self.path, e))
    }
}

impl CredentialStore for FileCredentialStore {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<CredentialSet> {
        self.read()?.ok_or_else(|| Error::ConfigurationMissing {
            source_hint: format!(
                "config file {} does not exist. Set environment variables or create it",
                self.path.display()
            ),
        })
    }

    #[instrument(skip(self, updates), fields(path = %self.path.display()))]
    fn save(&self, updates: &CredentialSet) -> Result<CredentialSet> {
        let current = self.read()?;

        if current.is_some() {
            self.backup()?;
        }

        let merged = current.unwrap_or_default().merged(updates);
        self.write(&merged)?;

        info!(
            fields = %updates.keys().collect::<Vec<_>>().join(", "),
            "Configuration updated successfully"
        );
        Ok(merged)
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}
