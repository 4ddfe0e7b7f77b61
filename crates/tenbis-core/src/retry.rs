//! HTTP execution with bounded retries and exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use crate::error::{Error, TransportError};
use crate::traits::Transport;
use crate::types::{AttemptOutcome, HttpResponse, RequestDescriptor};
use crate::Result;

/// Attempts per logical request unless configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Backoff unit; the delay after attempt `n` is `unit * 2^n`.
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// Executes one logical HTTP operation despite transient failures.
///
/// Responses below 400 succeed, 4xx responses fail immediately, and 5xx
/// responses, connection failures or timeouts are retried up to
/// `max_attempts` calls in total.
#[derive(Clone)]
pub struct ResilientClient {
    transport: Arc<dyn Transport>,
    max_attempts: u32,
    backoff_unit: Duration,
}

impl ResilientClient {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_arc(Arc::new(transport))
    }

    pub fn from_arc(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
        }
    }

    /// Set the attempt budget. Values below 1 are treated as 1.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay inserted after a failed `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.backoff_unit.saturating_mul(factor)
    }

    /// Execute `request`, retrying retryable failures.
    ///
    /// # Errors
    ///
    /// - [`Error::Client`] on the first 4xx response
    /// - [`Error::RetriesExhausted`] when every attempt failed retryably
    #[instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    pub async fn execute(&self, request: &RequestDescriptor) -> Result<HttpResponse> {
        let max = self.max_attempts;
        let mut last_cause: Option<TransportError> = None;

        for attempt in 1..=max {
            debug!(attempt, max_attempts = max, "Making HTTP request");

            let outcome = AttemptOutcome::classify(self.transport.send(request).await);
            let label = outcome.label();

            match outcome {
                AttemptOutcome::Success(response) => {
                    info!(
                        attempt,
                        max_attempts = max,
                        outcome = label,
                        status = response.status,
                        "HTTP request successful"
                    );
                    return Ok(response);
                }
                AttemptOutcome::ClientError { status, body } => {
                    error!(
                        attempt,
                        max_attempts = max,
                        outcome = label,
                        status,
                        "HTTP request rejected, not retrying"
                    );
                    return Err(Error::Client { status, body });
                }
                AttemptOutcome::ServerOrNetworkError(cause) => {
                    warn!(
                        attempt,
                        max_attempts = max,
                        outcome = label,
                        error = %cause,
                        "HTTP request failed"
                    );
                    last_cause = Some(cause);

                    if attempt < max {
                        let delay = self.backoff_delay(attempt);
                        info!(delay_ms = delay.as_millis() as u64, "Waiting before retry");
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(Error::RetriesExhausted {
            attempts: max,
            last_cause: last_cause.unwrap_or(TransportError::Http {
                message: "no attempt was made".to_string(),
            }),
        })
    }
}

impl std::fmt::Debug for ResilientClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientClient")
            .field("max_attempts", &self.max_attempts)
            .field("backoff_unit", &self.backoff_unit)
            .finish()
    }
}
