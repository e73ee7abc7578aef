//! Well-known paths, headers and defaults used throughout the crate.

/// Gateway base URL used when none is configured.
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8080";

/// Environment variable holding the gateway API key.
pub const API_KEY_ENV: &str = "REQUESTY_API_KEY";

/// Environment variable overriding the gateway base URL.
pub const GATEWAY_URL_ENV: &str = "GATEWAY_URL";

/// Path of the Messages endpoint, relative to the base URL.
pub const MESSAGES_PATH: &str = "/v1/messages";

/// Header carrying the API key on the raw-HTTP path.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header selecting the Anthropic Messages API version.
pub const ANTHROPIC_VERSION_HEADER: &str = "anthropic-version";

/// Messages API version sent with every request.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// MIME type of a Server-Sent Events body.
pub const EVENT_STREAM_MIME: &str = "text/event-stream";

/// Default model for the raw streaming probe.
pub const DEFAULT_RAW_MODEL: &str = "gpt-4o-mini";

/// Default model for the Messages API probe (provider-prefixed).
pub const DEFAULT_SDK_MODEL: &str = "openai/gpt-4o-mini";

/// Default `max_tokens` when a request does not set one.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
