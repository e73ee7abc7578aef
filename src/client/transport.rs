//! Transport layer for gateway communication.
//!
//! Provides the `Transport` trait for abstracting over how requests reach the
//! gateway, and `HttpTransport` for plain JSON over HTTP with `reqwest`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;

use crate::config::GatewayConfig;
use crate::error::{ProbeError, ProbeResult};
use crate::utils::constants::{ANTHROPIC_VERSION_HEADER, EVENT_STREAM_MIME};

use super::sse::SseStream;

/// Transport abstraction for gateway calls.
///
/// Implementations POST a JSON body and hand back either the parsed JSON
/// response or an SSE event stream.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `url` and parse the response as JSON.
    async fn send(&self, url: &str, body: &Value) -> ProbeResult<Value>;

    /// POST `body` to `url` and open the response as an SSE stream.
    async fn send_stream(&self, url: &str, body: &Value) -> ProbeResult<SseStream>;

    /// Close the transport and release any held resources.
    ///
    /// The default implementation is a no-op.
    async fn close(&self) -> ProbeResult<()> {
        Ok(())
    }
}

/// JSON over HTTP transport using `reqwest`.
///
/// Every request carries `Content-Type: application/json`, the API key
/// header and `anthropic-version`. Non-2xx responses become
/// [`ProbeError::Http`] with the raw body; nothing is retried.
///
/// # Example
///
/// ```no_run
/// use gateway_probe::client::HttpTransport;
/// use gateway_probe::config::GatewayConfig;
///
/// let config = GatewayConfig::new("http://localhost:8080", "my-key");
/// let transport = HttpTransport::new(&config).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport from a gateway configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Config`] if a header name or value is invalid.
    pub fn new(config: &GatewayConfig) -> ProbeResult<Self> {
        let mut default_headers = HeaderMap::new();
        insert_header(
            &mut default_headers,
            &config.api_key_header,
            &config.api_key,
            true,
        )?;
        insert_header(
            &mut default_headers,
            ANTHROPIC_VERSION_HEADER,
            &config.anthropic_version,
            false,
        )?;
        for (key, value) in &config.headers {
            let sensitive = key.eq_ignore_ascii_case("authorization");
            insert_header(&mut default_headers, key, value, sensitive)?;
        }

        let mut builder = reqwest::Client::builder().default_headers(default_headers);
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProbeError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Create a transport with an existing `reqwest::Client`.
    ///
    /// The client is used as-is: credentials must already be among its
    /// default headers.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn post(&self, url: &str, body: &Value, stream: bool) -> ProbeResult<reqwest::Response> {
        let body = serde_json::to_vec(body)
            .map_err(|e| ProbeError::Transport(format!("failed to serialize request: {e}")))?;

        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if stream {
            request = request.header(ACCEPT, EVENT_STREAM_MIME);
        }

        tracing::debug!(url, stream, "sending gateway request");
        let response = request.send().await?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "gateway responded");
        if !status.is_success() {
            return Err(ProbeError::Http {
                status: status.as_u16(),
                body: error_body(response.text().await),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, url: &str, body: &Value) -> ProbeResult<Value> {
        let response = self.post(url, body, false).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProbeError::Transport(format!("failed to read response body: {e}")))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| ProbeError::InvalidJson(format!("failed to parse response: {e}")))
    }

    async fn send_stream(&self, url: &str, body: &Value) -> ProbeResult<SseStream> {
        let response = self.post(url, body, true).await?;
        Ok(SseStream::from_response(response))
    }
}

/// Body text of an error response, or a note saying why it could not be read.
fn error_body<E: std::fmt::Display>(text: Result<String, E>) -> String {
    text.unwrap_or_else(|e| format!("<failed to read body: {e}>"))
}

fn insert_header(
    headers: &mut HeaderMap,
    key: &str,
    value: &str,
    sensitive: bool,
) -> ProbeResult<()> {
    let name = HeaderName::from_bytes(key.as_bytes())
        .map_err(|e| ProbeError::Config(format!("invalid header name '{key}': {e}")))?;
    let mut value = HeaderValue::from_str(value)
        .map_err(|e| ProbeError::Config(format!("invalid value for header '{key}': {e}")))?;
    value.set_sensitive(sensitive);
    headers.insert(name, value);
    Ok(())
}
