//! Transport-agnostic request and response types.

use std::fmt;
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::error::{Error, TransportError};

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP methods used against the remote API and notification endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body payload of a request.
#[derive(Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Form(Vec<(String, String)>),
}

// Bodies carry tokens and client secrets.
impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Json(_) => f.write_str("Json([REDACTED])"),
            Body::Form(fields) => f
                .debug_tuple("Form")
                .field(&fields.iter().map(|(k, _)| k).collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// Everything needed to issue one HTTP request.
///
/// Header names are unique ignoring ASCII case; inserting a header that is
/// already present replaces its value.
#[derive(Clone)]
pub struct RequestDescriptor {
    method: Method,
    url: Url,
    headers: Vec<(String, String)>,
    body: Option<Body>,
    timeout: Duration,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Parse `url` and create a descriptor for it.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not a valid absolute URL.
    pub fn parse(method: Method, url: &str) -> Result<Self, Error> {
        let url = Url::parse(url)
            .map_err(|e| Error::InvalidInput(format!("invalid URL '{}': {}", url, e)))?;
        Ok(Self::new(method, url))
    }

    /// Add a header, replacing any header with the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name, value)),
        }
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(Body::Json(body));
        self
    }

    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = Some(Body::Form(fields));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the value of a header, matching the name case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn timeout_duration(&self) -> Duration {
        self.timeout
    }
}

// Headers and bodies carry tokens.
impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field(
                "headers",
                &self.headers.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// A response as received from the transport, for any status code.
#[derive(Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Header pairs in arrival order; names are lowercase and may repeat
    /// (`set-cookie`).
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    /// First value of a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Every value of a header, in arrival order.
    pub fn header_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parse the body as JSON. Empty or non-JSON bodies yield `None`.
    pub fn json(&self) -> Option<Value> {
        if self.body.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&self.body).ok()
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field(
                "headers",
                &self.headers.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .field("body_len", &self.body.len())
            .finish()
    }
}

/// Classification of a single attempt; drives the retry decision.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// Any status below 400.
    Success(HttpResponse),
    /// A 4xx status. Terminal.
    ClientError { status: u16, body: String },
    /// A 5xx status, connection failure or timeout. Retryable.
    ServerOrNetworkError(TransportError),
}

impl AttemptOutcome {
    /// Classify the result of one transport call.
    pub fn classify(result: Result<HttpResponse, TransportError>) -> Self {
        match result {
            Ok(response) if response.status < 400 => AttemptOutcome::Success(response),
            Ok(response) if response.status < 500 => AttemptOutcome::ClientError {
                status: response.status,
                body: response.body,
            },
            Ok(response) => AttemptOutcome::ServerOrNetworkError(TransportError::Server {
                status: response.status,
                body: response.body,
            }),
            Err(err) => AttemptOutcome::ServerOrNetworkError(err),
        }
    }

    /// Short label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            AttemptOutcome::Success(_) => "success",
            AttemptOutcome::ClientError { .. } => "client_error",
            AttemptOutcome::ServerOrNetworkError(_) => "server_or_network_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_insert_replaces_case_insensitively() {
        let request = RequestDescriptor::parse(Method::Post, "https://api.example.com/x")
            .unwrap()
            .header("Content-Type", "text/plain")
            .header("content-type", "application/json");

        assert_eq!(request.headers().len(), 1);
        assert_eq!(
            request.header_value("CONTENT-TYPE"),
            Some("application/json")
        );
    }

    #[test]
    fn classify_by_status() {
        assert!(matches!(
            AttemptOutcome::classify(Ok(HttpResponse::new(204, ""))),
            AttemptOutcome::Success(_)
        ));
        assert!(matches!(
            AttemptOutcome::classify(Ok(HttpResponse::new(302, ""))),
            AttemptOutcome::Success(_)
        ));
        assert!(matches!(
            AttemptOutcome::classify(Ok(HttpResponse::new(404, "nope"))),
            AttemptOutcome::ClientError { status: 404, .. }
        ));
        assert!(matches!(
            AttemptOutcome::classify(Ok(HttpResponse::new(500, ""))),
            AttemptOutcome::ServerOrNetworkError(TransportError::Server { status: 500, .. })
        ));
        assert!(matches!(
            AttemptOutcome::classify(Err(TransportError::Timeout { duration_ms: 1 })),
            AttemptOutcome::ServerOrNetworkError(_)
        ));
    }

    #[test]
    fn outcome_labels() {
        let labels: Vec<_> = [200, 401, 502]
            .into_iter()
            .map(|status| AttemptOutcome::classify(Ok(HttpResponse::new(status, ""))).label())
            .collect();
        assert_eq!(labels, ["success", "client_error", "server_or_network_error"]);
    }

    #[test]
    fn response_headers_may_repeat() {
        let response = HttpResponse::new(200, "")
            .with_header("Set-Cookie", "a=1")
            .with_header("Set-Cookie", "b=2");

        let cookies: Vec<_> = response.header_all("set-cookie").collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);
    }

    #[test]
    fn header_lookup_outlives_the_name() {
        let response = HttpResponse::new(200, "").with_header("X-Access-Token", "abc");
        let value = {
            let name = String::from("x-access-token");
            response.header(&name)
        };
        assert_eq!(value, Some("abc"));
    }

    #[test]
    fn empty_body_is_not_json() {
        assert!(HttpResponse::new(200, "  ").json().is_none());
        assert!(HttpResponse::new(200, "<html>").json().is_none());
    }

    #[test]
    fn debug_hides_header_values() {
        let request = RequestDescriptor::parse(Method::Patch, "https://api.example.com/x")
            .unwrap()
            .header("Authorization", "Bearer secret-value");
        let debug = format!("{:?}", request);
        assert!(!debug.contains("secret-value"));
    }
}
