//! Shared test utilities for integration tests.
//!
//! Provides an in-process mock gateway that serves `/v1/messages` with a
//! canned reply and records every request it receives.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures::StreamExt;
use gateway_probe::config::GatewayConfig;

/// What the mock gateway answers with.
#[derive(Debug, Clone)]
pub enum Reply {
    /// A complete `text/event-stream` body.
    Sse(String),
    /// An event-stream body that never closes after the given text.
    SseThenHang(String),
    /// A JSON body with status 200.
    Json(serde_json::Value),
    /// An arbitrary status with a plain-text body.
    Status(StatusCode, String),
}

/// One request as seen by the mock gateway.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

#[derive(Clone)]
struct MockState {
    reply: Reply,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// A running mock gateway.
pub struct MockGateway {
    pub base_url: String,
    pub recorded: Arc<Mutex<Vec<RecordedRequest>>>,
    pub handle: tokio::task::JoinHandle<()>,
}

impl MockGateway {
    /// Config pointing at this gateway with the test key.
    pub fn config(&self) -> GatewayConfig {
        GatewayConfig::new(&self.base_url, TEST_API_KEY)
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded.lock().unwrap().clone()
    }
}

pub const TEST_API_KEY: &str = "test-key-123";

async fn messages(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state
        .recorded
        .lock()
        .unwrap()
        .push(RecordedRequest { headers, body });

    match state.reply {
        Reply::Sse(text) => ([(header::CONTENT_TYPE, "text/event-stream")], text).into_response(),
        Reply::SseThenHang(text) => {
            let chunks = futures::stream::iter(vec![Ok::<_, std::convert::Infallible>(text)])
                .chain(futures::stream::pending());
            (
                [(header::CONTENT_TYPE, "text/event-stream")],
                Body::from_stream(chunks),
            )
                .into_response()
        }
        Reply::Json(value) => Json(value).into_response(),
        Reply::Status(status, text) => (status, text).into_response(),
    }
}

/// Start a mock gateway on a random port.
pub async fn start_mock_gateway(reply: Reply) -> MockGateway {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    let recorded = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        reply,
        recorded: recorded.clone(),
    };
    let app = Router::new()
        .route("/v1/messages", post(messages))
        .with_state(state);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Brief wait for the server to start accepting connections.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    MockGateway {
        base_url,
        recorded,
        handle,
    }
}

/// Anthropic-format transcript as the gateway emits it after translating an
/// OpenAI stream.
pub fn anthropic_transcript() -> String {
    [
        "event: message_start",
        r#"data: {"type":"message_start","id":"msg_1","model":"gpt-4o-mini","role":"assistant","message":{"content":[]}}"#,
        "",
        "event: content_block_start",
        r#"data: {"type":"content_block_start","index":0,"content_block":{"type":"text","text":""}}"#,
        "",
        "event: content_block_delta",
        r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hello"}}"#,
        "",
        "event: content_block_delta",
        r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":" there!"}}"#,
        "",
        "event: content_block_stop",
        r#"data: {"type":"content_block_stop","index":0}"#,
        "",
        "event: message_stop",
        r#"data: {"type":"message_stop","id":"msg_1","role":"assistant","usage":{"input_tokens":12,"output_tokens":3}}"#,
        "",
        "event: done",
        "data: [DONE]",
        "",
        "",
    ]
    .join("\n")
}

/// Raw OpenAI chat-completion chunks.
pub fn openai_transcript() -> String {
    [
        r#"data: {"id":"c1","object":"chat.completion.chunk","choices":[{"index":0,"delta":{"role":"assistant"}}]}"#,
        "",
        r#"data: {"id":"c1","object":"chat.completion.chunk","choices":[{"index":0,"delta":{"content":"Hi"}}]}"#,
        "",
        ": keep-alive",
        "",
        r#"data: {"id":"c1","object":"chat.completion.chunk","choices":[{"index":0,"delta":{"content":"!"}}]}"#,
        "",
        "data: [DONE]",
        "",
        "",
    ]
    .join("\r\n")
}
