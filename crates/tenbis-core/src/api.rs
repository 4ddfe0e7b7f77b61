//! Request builders for the 10bis web API.

use std::time::Duration;

use serde_json::{Value, json};
use url::Url;

use crate::error::Error;
use crate::types::{CredentialField, CredentialSet, DEFAULT_TIMEOUT, Method, RequestDescriptor};
use crate::Result;

/// Production API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.10bis.co.il";

/// Endpoint exchanging a refresh token for new session tokens.
const REFRESH_TOKEN_PATH: &str = "api/v1/Authentication/RefreshToken";

/// Endpoint loading credit onto a money card.
const LOAD_CREDIT_PATH: &str = "api/v1/Payments/LoadTenbisCredit";

const ACCEPT: &str = "application/json, text/plain, */*";
const ORIGIN: &str = "https://www.10bis.co.il";
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";

/// Builds request descriptors for the two scheduled operations.
#[derive(Debug, Clone)]
pub struct TenbisApi {
    base: Url,
    timeout: Duration,
}

impl TenbisApi {
    /// Create an API for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` is not an http(s) URL.
    pub fn new(base: &str) -> Result<Self> {
        let mut base = Url::parse(base)
            .map_err(|e| Error::InvalidInput(format!("invalid API base '{}': {}", base, e)))?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::InvalidInput(format!(
                "API base must be http(s), got '{}'",
                base.scheme()
            )));
        }

        // Url::join replaces the last segment unless the path ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            base,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn production() -> Self {
        Self {
            base: Url::parse(DEFAULT_API_BASE).expect("valid constant URL"),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| Error::InvalidInput(format!("invalid endpoint '{}': {}", path, e)))
    }

    fn browser_request(&self, method: Method, path: &str) -> Result<RequestDescriptor> {
        Ok(RequestDescriptor::new(method, self.endpoint(path)?)
            .header("Accept", ACCEPT)
            .header("Language", "he")
            .header("X-App-Type", "web")
            .header("Content-Type", "application/json")
            .header("User-Agent", USER_AGENT)
            .timeout(self.timeout))
    }

    /// `POST RefreshToken` with `{"refreshToken": …}`.
    ///
    /// The session cookie is attached only when both tokens are known.
    pub fn refresh_token_request(&self, credentials: &CredentialSet) -> Result<RequestDescriptor> {
        let refresh_token = credentials
            .field(CredentialField::RefreshToken)
            .ok_or_else(|| Error::Validation {
                missing: vec![CredentialField::RefreshToken.to_string()],
            })?;

        let mut request = self
            .browser_request(Method::Post, REFRESH_TOKEN_PATH)?
            .json(json!({ "refreshToken": refresh_token }));

        if let Some(access_token) = credentials.field(CredentialField::AccessToken) {
            request = request.header(
                "Cookie",
                format!(
                    "Authorization={}; RefreshToken={}",
                    access_token, refresh_token
                ),
            );
        }

        Ok(request)
    }

    /// `PATCH LoadTenbisCredit` with `{"amount": …, "moneycardIdToCharge": …}`.
    pub fn load_credit_request(&self, credentials: &CredentialSet) -> Result<RequestDescriptor> {
        credentials.validate(&[
            CredentialField::AccessToken,
            CredentialField::RefreshToken,
            CredentialField::Amount,
            CredentialField::MoneycardId,
        ])?;

        // validate() guarantees presence.
        let field = |f: CredentialField| credentials.field(f).unwrap_or_default();
        let access_token = field(CredentialField::AccessToken);
        let refresh_token = field(CredentialField::RefreshToken);

        let body = json!({
            "amount": raw_or_string(credentials, CredentialField::Amount),
            "moneycardIdToCharge": raw_or_string(credentials, CredentialField::MoneycardId),
        });

        Ok(self
            .browser_request(Method::Patch, LOAD_CREDIT_PATH)?
            .header("Authorization", format!("Bearer {}", access_token))
            .header("Origin", ORIGIN)
            .header(
                "Cookie",
                format!(
                    "Authorization={}; RefreshToken={}",
                    access_token, refresh_token
                ),
            )
            .json(body))
    }
}

/// Send numbers as numbers and everything else as the stored string.
fn raw_or_string(credentials: &CredentialSet, field: CredentialField) -> Value {
    match credentials.get_value(field.key()) {
        Some(number @ Value::Number(_)) => number.clone(),
        _ => Value::String(credentials.field(field).unwrap_or_default()),
    }
}
