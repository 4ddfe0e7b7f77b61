//! Error types for tenbis operations.
//!
//! Every failure a scheduled action can hit maps onto one variant of [`Error`].
//! Retryable network and server failures are described by [`TransportError`]
//! and only surface to callers wrapped in [`Error::RetriesExhausted`].

use thiserror::Error;

/// The unified error type for tenbis operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Neither the environment nor the configuration file yielded any data.
    #[error("no configuration found: {source_hint}")]
    ConfigurationMissing { source_hint: String },

    /// One or more required credential fields are absent or blank.
    #[error("missing required configuration fields: {}", missing.join(", "))]
    Validation { missing: Vec<String> },

    /// The remote API rejected the request with a 4xx status. Never retried.
    #[error("HTTP {status}: {body}")]
    Client { status: u16, body: String },

    /// Every attempt failed with a retryable error.
    #[error("all {attempts} attempts failed. Last error: {last_cause}")]
    RetriesExhausted {
        attempts: u32,
        last_cause: TransportError,
    },

    /// Writing the backup or the updated credential set failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Input that could not be turned into a request (bad URL, malformed JSON).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A notification endpoint refused or could not be reached.
    #[error("notification failed: {0}")]
    Notification(String),
}

impl Error {
    /// Check if this is an authentication error.
    ///
    /// A 401 status or an "Unauthorized" message hints that the companion
    /// token refresh action should run.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Error::Client { status: 401, .. } => true,
            other => other.to_string().contains("Unauthorized"),
        }
    }

    /// Short machine-friendly tag for step outputs and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::ConfigurationMissing { .. } => "configuration_missing",
            Error::Validation { .. } => "validation",
            Error::Client { .. } => "client",
            Error::RetriesExhausted { .. } => "retries_exhausted",
            Error::Persistence(_) => "persistence",
            Error::InvalidInput(_) => "invalid_input",
            Error::Notification(_) => "notification",
        }
    }
}

/// Retryable failures of a single attempt.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The server answered with a 5xx status.
    #[error("HTTP {status}: {body}")]
    Server { status: u16, body: String },

    /// Any other transport-level failure (TLS, body decoding, redirects).
    #[error("HTTP error: {message}")]
    Http { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_lists_every_missing_field() {
        let err = Error::Validation {
            missing: vec!["AccessToken".into(), "Amount".into()],
        };
        assert_eq!(
            err.to_string(),
            "missing required configuration fields: AccessToken, Amount"
        );
    }

    #[test]
    fn auth_error_detection() {
        let unauthorized = Error::Client {
            status: 401,
            body: String::new(),
        };
        assert!(unauthorized.is_auth_error());

        let forbidden = Error::Client {
            status: 403,
            body: "Unauthorized access".into(),
        };
        assert!(forbidden.is_auth_error());

        let exhausted = Error::RetriesExhausted {
            attempts: 3,
            last_cause: TransportError::Server {
                status: 503,
                body: "unavailable".into(),
            },
        };
        assert!(!exhausted.is_auth_error());
    }

    #[test]
    fn retries_exhausted_mentions_attempts_and_cause() {
        let err = Error::RetriesExhausted {
            attempts: 3,
            last_cause: TransportError::Timeout { duration_ms: 30_000 },
        };
        let msg = err.to_string();
        assert!(msg.contains("all 3 attempts failed"));
        assert!(msg.contains("30000ms"));
    }
}
