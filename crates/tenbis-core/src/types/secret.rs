//! Secret string wrapper.

use std::fmt;

/// A secret credential value such as an access or refresh token.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw value.
    ///
    /// # Security
    ///
    /// Use only when constructing request headers or bodies.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// A short preview safe for operator output: first and last four
    /// characters plus the length. Short secrets are fully hidden.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 12 {
            return format!("****** (length: {})", chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{} (length: {})", head, tail, chars.len())
    }
}

// Hide secret value in Debug output
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Secret").field(&"[REDACTED]").finish()
    }
}
