//! Outcome notification trait.

use async_trait::async_trait;

use crate::Result;

/// Whether the reported run succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStatus {
    Success,
    Failure,
}

impl NotificationStatus {
    pub fn is_success(self) -> bool {
        matches!(self, NotificationStatus::Success)
    }

    pub fn label(self) -> &'static str {
        match self {
            NotificationStatus::Success => "Success",
            NotificationStatus::Failure => "Failed",
        }
    }
}

/// The outcome of one scheduled action, as shown to a human.
#[derive(Debug, Clone)]
pub struct Notification {
    pub status: NotificationStatus,
    /// Title of the action, e.g. "Credit Loading".
    pub action: String,
    pub amount: Option<String>,
    /// Local time of the run, already formatted.
    pub timestamp: String,
    pub error: Option<String>,
    /// The failure looks like an expired or rejected token.
    pub auth_error: bool,
}

impl Notification {
    pub fn success(action: impl Into<String>, amount: Option<String>, timestamp: String) -> Self {
        Self {
            status: NotificationStatus::Success,
            action: action.into(),
            amount,
            timestamp,
            error: None,
            auth_error: false,
        }
    }

    pub fn failure(
        action: impl Into<String>,
        amount: Option<String>,
        timestamp: String,
        error: impl Into<String>,
        auth_error: bool,
    ) -> Self {
        Self {
            status: NotificationStatus::Failure,
            action: action.into(),
            amount,
            timestamp,
            error: Some(error.into()),
            auth_error,
        }
    }

    /// "Credit Loading Success" / "Token Refresh Failed".
    pub fn headline(&self) -> String {
        format!("{} {}", self.action, self.status.label())
    }

    /// Error text including the token refresh hint for auth failures.
    pub fn error_text(&self) -> Option<String> {
        let error = self.error.as_deref()?;
        if self.auth_error {
            Some(format!(
                "{} (authentication error, tokens may need refresh)",
                error
            ))
        } else {
            Some(error.to_string())
        }
    }
}

/// Delivers a [`Notification`] to a human.
///
/// Callers treat delivery errors as non-fatal.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Name for log lines, e.g. "teams-webhook".
    fn name(&self) -> &'static str;

    async fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Notifier used when nothing is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn notify(&self, notification: &Notification) -> Result<()> {
        tracing::debug!(
            headline = %notification.headline(),
            "No notifier configured, skipping notification"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_carry_refresh_hint() {
        let n = Notification::failure(
            "Credit Loading",
            Some("100".into()),
            "01/02/2026, 10:00:00 AM".into(),
            "HTTP 401: Unauthorized",
            true,
        );
        assert_eq!(n.headline(), "Credit Loading Failed");
        assert!(n.error_text().unwrap().contains("tokens may need refresh"));
    }

    #[test]
    fn success_has_no_error_text() {
        let n = Notification::success("Token Refresh", None, "now".into());
        assert_eq!(n.headline(), "Token Refresh Success");
        assert!(n.error_text().is_none());
    }
}
