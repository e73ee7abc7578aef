//! # gateway-probe — diagnostic client for LLM inference gateways
//!
//! Sends requests to a gateway that proxies OpenAI- and Anthropic-style
//! model APIs, and decodes its Server-Sent Events (SSE) responses for human
//! inspection.
//!
//! ## Overview
//!
//! The heart of the crate is [`sse`]: a line-at-a-time decoder that turns
//! `data: ` lines into [`sse::DecodedEvent`]s and stops for good at the
//! `data: [DONE]` sentinel. It works on any iterator of lines or any blocking
//! reader, with no network involved.
//!
//! The [`client`] module (feature `client`) wraps the decoder around a live
//! `reqwest` response body and adds a small Messages-API client.
//!
//! ## Feature flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `client` | yes     | HTTP client and async SSE streaming (reqwest) |
//! | `cli`    | yes     | The `gateway-probe` command-line binary |
//!
//! ## Quick Start: decoding
//!
//! ```
//! use gateway_probe::sse::{decode_lines, DecodedEvent};
//!
//! let lines = [
//!     "event: content_block_delta",
//!     "data: {\"type\":\"content_block_delta\",\"delta\":{\"text\":\"Hi\"}}",
//!     "data: not-json",
//!     "data: [DONE]",
//! ];
//!
//! for event in decode_lines(lines) {
//!     match event {
//!         DecodedEvent::Data(value) => println!("parsed: {value}"),
//!         DecodedEvent::Malformed { error, .. } => println!("parse error: {error}"),
//!         DecodedEvent::Done => println!("stream completed"),
//!     }
//! }
//! ```
//!
//! ## Quick Start: streaming from a gateway
//!
//! ```no_run
//! use gateway_probe::client::GatewayClient;
//! use gateway_probe::config::GatewayConfig;
//! use gateway_probe::MessagesRequestBuilder;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads REQUESTY_API_KEY and GATEWAY_URL.
//!     let client = GatewayClient::new(GatewayConfig::from_env()?)?;
//!
//!     let request = MessagesRequestBuilder::new("gpt-4o-mini")
//!         .max_tokens(100)
//!         .user("Hello! Give me a short response.")
//!         .build();
//!
//!     let mut stream = client.stream_message(request).await?;
//!     while let Some(event) = stream.next().await {
//!         println!("{:?}", event?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod builders;
pub mod config;
pub mod error;
pub mod sse;
pub mod types;
pub mod utils;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "cli")]
pub mod cli;

/// Prelude module that re-exports commonly used types.
///
/// ```
/// use gateway_probe::prelude::*;
///
/// let events: Vec<DecodedEvent> = decode_lines(["data: [DONE]"]).collect();
/// assert!(events[0].is_done());
/// ```
pub mod prelude {
    pub use crate::builders::MessagesRequestBuilder;
    pub use crate::config::GatewayConfig;
    pub use crate::error::{ProbeError, ProbeResult};
    pub use crate::sse::{decode_lines, decode_reader, DecodedEvent, LineDecoder};
    pub use crate::types::{ChatMessage, MessagesRequest, MessagesResponse, Role};

    #[cfg(feature = "client")]
    pub use crate::builders::ClientBuilder;

    #[cfg(feature = "client")]
    pub use crate::client::{GatewayClient, SseStream, TextStream};
}

// Re-export core types at crate root for convenience.
pub use builders::MessagesRequestBuilder;
pub use error::{ProbeError, ProbeResult};
pub use types::*;

#[cfg(feature = "client")]
pub use builders::ClientBuilder;
