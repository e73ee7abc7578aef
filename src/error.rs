//! Error types for gateway probing.
//!
//! Every failure is either fatal-and-reported (transport, HTTP status, missing
//! credential) or skip-and-continue. Malformed SSE payloads are *not* errors:
//! they surface as [`crate::sse::DecodedEvent::Malformed`] so a stream keeps
//! going past a bad line.

use crate::utils::constants::API_KEY_ENV;

/// Unified error type for configuration, transport and decoding failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProbeError {
    /// Transport-level error (connection failed, request failed, body read failed).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request timed out while connecting.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Non-success HTTP status, with the raw response body.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// A whole-body JSON response could not be parsed or deserialized.
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// The API key was not supplied.
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// Invalid configuration value (bad URL, bad header).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local I/O error (reading a captured transcript).
    #[error("I/O error: {0}")]
    Io(String),

    /// Catch-all for errors that don't fit other categories.
    #[error("{0}")]
    Other(String),
}

/// Convenience result type for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

impl ProbeError {
    /// Create a `MissingCredential` error naming the expected environment variable.
    pub fn missing_api_key() -> Self {
        Self::MissingCredential(format!("{API_KEY_ENV} not found in environment variables"))
    }

    /// Returns the HTTP status code if this is an [`ProbeError::Http`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProbeError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error should abort the process before any network call.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            ProbeError::MissingCredential(_) | ProbeError::Config(_)
        )
    }
}

impl From<serde_json::Error> for ProbeError {
    fn from(err: serde_json::Error) -> Self {
        ProbeError::InvalidJson(err.to_string())
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        ProbeError::Io(err.to_string())
    }
}

#[cfg(feature = "client")]
impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout(format!("request timed out: {err}"))
        } else if err.is_connect() {
            ProbeError::Transport(format!("connection failed: {err}"))
        } else {
            ProbeError::Transport(format!("HTTP request failed: {err}"))
        }
    }
}
