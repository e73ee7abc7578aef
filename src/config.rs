//! Gateway connection settings.
//!
//! The API key is read once at start-up and carried in a [`GatewayConfig`]
//! that is handed to the client, never looked up again from global state.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{ProbeError, ProbeResult};
use crate::utils::constants::{
    ANTHROPIC_VERSION, API_KEY_ENV, API_KEY_HEADER, DEFAULT_GATEWAY_URL, GATEWAY_URL_ENV, MESSAGES_PATH,
};

/// Connection settings for one gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Base URL without a trailing slash, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// API key sent under [`GatewayConfig::api_key_header`].
    pub api_key: String,
    /// Header name for the API key. Defaults to `x-api-key`.
    pub api_key_header: String,
    /// Value of the `anthropic-version` header.
    pub anthropic_version: String,
    /// Optional connect timeout. No total request timeout is applied so that
    /// long streams are never cut off.
    pub connect_timeout: Option<Duration>,
    /// Additional HTTP headers to include on every request.
    pub headers: HashMap<String, String>,
}

// Keeps the key out of logs.
impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("api_key_header", &self.api_key_header)
            .field("anthropic_version", &self.anthropic_version)
            .field("connect_timeout", &self.connect_timeout)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl GatewayConfig {
    /// Create a config for `base_url` authenticated with `api_key`.
    ///
    /// A trailing `/` on the URL is trimmed.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            api_key: api_key.into(),
            api_key_header: API_KEY_HEADER.to_string(),
            anthropic_version: ANTHROPIC_VERSION.to_string(),
            connect_timeout: None,
            headers: HashMap::new(),
        }
    }

    /// Build a config from `REQUESTY_API_KEY` and `GATEWAY_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::MissingCredential`] when the key is unset or empty.
    pub fn from_env() -> ProbeResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ProbeResult<Self> {
        let api_key = lookup(API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(ProbeError::missing_api_key)?;
        let base_url = lookup(GATEWAY_URL_ENV)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string());
        Self::new(base_url, api_key).validated()
    }

    /// Check that the URL has an HTTP scheme and the key is non-empty.
    pub fn validated(self) -> ProbeResult<Self> {
        if self.api_key.trim().is_empty() {
            return Err(ProbeError::missing_api_key());
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ProbeError::Config(format!(
                "gateway URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        Ok(self)
    }

    /// Full URL of the Messages endpoint.
    pub fn messages_url(&self) -> String {
        format!("{}{}", self.base_url, MESSAGES_PATH)
    }

    /// Set the connect timeout (builder-style).
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Send the key under a different header (builder-style).
    pub fn with_api_key_header(mut self, header: impl Into<String>) -> Self {
        self.api_key_header = header.into();
        self
    }

    /// Add a custom header (builder-style).
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
