//! Builder patterns for ergonomic construction of requests and clients.

#[cfg(feature = "client")]
use std::collections::HashMap;

use crate::types::{ChatMessage, MessagesRequest};
use crate::utils::constants::DEFAULT_MAX_TOKENS;

/// Builder for constructing [`MessagesRequest`] with sensible defaults.
///
/// # Example
///
/// ```
/// use gateway_probe::builders::MessagesRequestBuilder;
///
/// let request = MessagesRequestBuilder::new("gpt-4o-mini")
///     .max_tokens(100)
///     .user("Hello! Give me a short response.")
///     .stream(true)
///     .build();
///
/// assert_eq!(request.messages.len(), 1);
/// assert!(request.stream);
/// ```
#[derive(Debug, Clone)]
pub struct MessagesRequestBuilder {
    model: String,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
    stream: bool,
    temperature: Option<f64>,
    top_p: Option<f64>,
    stop_sequences: Option<Vec<String>>,
}

impl MessagesRequestBuilder {
    /// Create a new builder for `model` with `max_tokens` 1024 and no messages.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            messages: Vec::new(),
            stream: false,
            temperature: None,
            top_p: None,
            stop_sequences: None,
        }
    }

    /// Set the token limit.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Append a user message.
    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::user(content));
        self
    }

    /// Append an assistant message.
    pub fn assistant(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::assistant(content));
        self
    }

    /// Append a message.
    pub fn message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Request incremental delivery.
    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set nucleus sampling.
    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Add a stop sequence.
    pub fn stop_sequence(mut self, stop: impl Into<String>) -> Self {
        self.stop_sequences
            .get_or_insert_with(Vec::new)
            .push(stop.into());
        self
    }

    /// Build the request.
    pub fn build(self) -> MessagesRequest {
        MessagesRequest {
            model: self.model,
            max_tokens: self.max_tokens,
            messages: self.messages,
            stream: self.stream,
            temperature: self.temperature,
            top_p: self.top_p,
            stop_sequences: self.stop_sequences,
        }
    }
}

/// Builder for constructing [`crate::client::GatewayClient`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// use gateway_probe::builders::ClientBuilder;
/// use std::time::Duration;
///
/// let client = ClientBuilder::new("http://localhost:8080")
///     .api_key("my-key")
///     .connect_timeout(Duration::from_secs(10))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "client")]
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    url: String,
    api_key: Option<String>,
    api_key_header: Option<String>,
    connect_timeout: Option<std::time::Duration>,
    headers: HashMap<String, String>,
}

#[cfg(feature = "client")]
impl ClientBuilder {
    /// Create a new client builder for the given base URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            api_key_header: None,
            connect_timeout: None,
            headers: HashMap::new(),
        }
    }

    /// Set the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Send the API key under a header other than `x-api-key`.
    pub fn api_key_header(mut self, header: impl Into<String>) -> Self {
        self.api_key_header = Some(header.into());
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Add a custom HTTP header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Assemble the [`GatewayConfig`](crate::config::GatewayConfig) without
    /// creating a client.
    pub fn into_config(self) -> crate::ProbeResult<crate::config::GatewayConfig> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(crate::ProbeError::missing_api_key)?;

        let mut config = crate::config::GatewayConfig::new(self.url, api_key);
        if let Some(header) = self.api_key_header {
            config = config.with_api_key_header(header);
        }
        if let Some(timeout) = self.connect_timeout {
            config = config.with_connect_timeout(timeout);
        }
        config.headers.extend(self.headers);
        config.validated()
    }

    /// Build the client.
    pub fn build(self) -> crate::ProbeResult<crate::client::GatewayClient> {
        crate::client::GatewayClient::new(self.into_config()?)
    }
}
