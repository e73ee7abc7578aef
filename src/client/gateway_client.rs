//! High-level client for the gateway's Messages endpoint.

use serde_json::Value;

use crate::config::GatewayConfig;
use crate::error::{ProbeError, ProbeResult};
use crate::types::{MessagesRequest, MessagesResponse};

use super::sse::{SseStream, TextStream};
use super::transport::{HttpTransport, Transport};

/// Client for one gateway.
///
/// Provides:
/// - [`create_message()`](Self::create_message) — one request, one JSON response
/// - [`stream_message()`](Self::stream_message) — raw decoded SSE events
/// - [`text_stream()`](Self::text_stream) — text deltas only
///
/// # Example
///
/// ```no_run
/// use gateway_probe::client::GatewayClient;
/// use gateway_probe::config::GatewayConfig;
/// use gateway_probe::MessagesRequestBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GatewayClient::new(GatewayConfig::from_env()?)?;
/// let request = MessagesRequestBuilder::new("openai/gpt-4o-mini")
///     .user("Hello, Claude!")
///     .build();
/// let reply = client.create_message(request).await?;
/// println!("{}", reply.text());
/// # Ok(())
/// # }
/// ```
pub struct GatewayClient {
    config: GatewayConfig,
    transport: Box<dyn Transport>,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    /// Create a client using an [`HttpTransport`] built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::MissingCredential`] if the key is empty, or
    /// [`ProbeError::Config`] if the URL or a header is invalid.
    pub fn new(config: GatewayConfig) -> ProbeResult<Self> {
        let config = config.validated()?;
        let transport = HttpTransport::new(&config)?;
        Ok(Self {
            config,
            transport: Box::new(transport),
        })
    }

    /// Create a client with a custom transport.
    pub fn with_transport(config: GatewayConfig, transport: Box<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Send a non-streaming Messages request.
    ///
    /// `request.stream` is forced to `false`.
    pub async fn create_message(&self, mut request: MessagesRequest) -> ProbeResult<MessagesResponse> {
        request.stream = false;
        let body = to_body(&request)?;
        let response = self.transport.send(&self.config.messages_url(), &body).await?;
        serde_json::from_value(response)
            .map_err(|e| ProbeError::InvalidJson(format!("failed to deserialize message: {e}")))
    }

    /// Send a streaming Messages request and return the decoded event stream.
    ///
    /// `request.stream` is forced to `true`.
    pub async fn stream_message(&self, mut request: MessagesRequest) -> ProbeResult<SseStream> {
        request.stream = true;
        let body = to_body(&request)?;
        self.transport
            .send_stream(&self.config.messages_url(), &body)
            .await
    }

    /// Send a streaming Messages request and return only the text deltas.
    pub async fn text_stream(&self, request: MessagesRequest) -> ProbeResult<TextStream> {
        Ok(self.stream_message(request).await?.into_text_stream())
    }

    /// Close the client and release any held resources.
    pub async fn close(self) -> ProbeResult<()> {
        self.transport.close().await
    }
}

fn to_body(request: &MessagesRequest) -> ProbeResult<Value> {
    serde_json::to_value(request)
        .map_err(|e| ProbeError::Transport(format!("failed to serialize request: {e}")))
}
