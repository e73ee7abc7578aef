//! Gateway client — call the Messages endpoint over HTTP.
//!
//! - [`GatewayClient`] — high-level client for plain and streaming requests
//! - [`Transport`] / [`HttpTransport`] — pluggable transport layer
//! - [`SseStream`] — decoded SSE events from one streaming response
//! - [`TextStream`] — text deltas only, from either vendor chunk format
//!
//! # Quick Start
//!
//! ```no_run
//! use gateway_probe::client::GatewayClient;
//! use gateway_probe::config::GatewayConfig;
//! use gateway_probe::MessagesRequestBuilder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GatewayClient::new(GatewayConfig::from_env()?)?;
//!
//! let request = MessagesRequestBuilder::new("gpt-4o-mini")
//!     .max_tokens(100)
//!     .user("Hello! Give me a short response.")
//!     .build();
//!
//! let mut stream = client.text_stream(request).await?;
//! while let Some(text) = stream.next().await {
//!     print!("{}", text?);
//! }
//! # Ok(())
//! # }
//! ```

mod gateway_client;
mod sse;
mod transport;

pub use gateway_client::GatewayClient;
pub use sse::{Frame, SseStream, TextStream, TextStreamAdapter};
pub use transport::{HttpTransport, Transport};
