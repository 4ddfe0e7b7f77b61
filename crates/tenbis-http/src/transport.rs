//! reqwest-backed transport.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument, trace};

use tenbis_core::{Body, Error, HttpResponse, Method, RequestDescriptor, Result, Transport, TransportError};

/// Single-attempt HTTP transport over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with rustls and the crate user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tenbis/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InvalidInput(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

fn method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Patch => reqwest::Method::PATCH,
    }
}

fn classify(err: reqwest::Error, request: &RequestDescriptor) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            duration_ms: request.timeout_duration().as_millis() as u64,
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    async fn send(&self, request: &RequestDescriptor) -> std::result::Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(method(request.method()), request.url().clone())
            .timeout(request.timeout_duration());

        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body() {
            Some(Body::Json(value)) => builder.json(value),
            Some(Body::Form(fields)) => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(fields.iter())
                    .finish();
                builder
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(encoded)
            }
            None => builder,
        };

        let response = builder.send().await.map_err(|e| classify(e, request))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_ascii_lowercase(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect::<Vec<_>>();
        trace!(status, headers = headers.len(), "HTTP response headers received");

        let body = response.text().await.map_err(|e| classify(e, request))?;
        debug!(status, body_len = body.len(), "HTTP exchange complete");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
