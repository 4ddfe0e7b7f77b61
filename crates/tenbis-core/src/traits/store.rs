//! Credential store trait.

use crate::Result;
use crate::types::CredentialSet;

/// Durable, validated access to the current credential set.
pub trait CredentialStore: Send + Sync {
    /// Human-readable description of the backing source, for logs.
    fn describe(&self) -> String;

    /// Read the current credential set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationMissing`](crate::Error::ConfigurationMissing)
    /// when the source yields no data.
    fn load(&self) -> Result<CredentialSet>;

    /// Merge `updates` over the persisted set and persist the result,
    /// keeping a backup of the previous version.
    ///
    /// Returns the merged set.
    fn save(&self, updates: &CredentialSet) -> Result<CredentialSet>;
}
