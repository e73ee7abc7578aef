//! Integration tests for the HTTP client against an in-process mock gateway.
//!
//! These tests verify the request shape, SSE decoding over a live body,
//! prompt termination at `[DONE]`, and HTTP error reporting.

mod common;

use std::time::Duration;

use futures::StreamExt;

use common::{anthropic_transcript, openai_transcript, start_mock_gateway, Reply, TEST_API_KEY};
use gateway_probe::client::GatewayClient;
use gateway_probe::sse::DecodedEvent;
use gateway_probe::{MessagesRequestBuilder, ProbeError};
use serde_json::json;

fn raw_request() -> gateway_probe::MessagesRequest {
    MessagesRequestBuilder::new("gpt-4o-mini")
        .max_tokens(100)
        .user("Hello! Give me a short response.")
        .build()
}

/// Test that a streaming request carries the expected headers and body.
#[tokio::test]
async fn test_stream_request_shape() {
    let gateway = start_mock_gateway(Reply::Sse("data: [DONE]\n\n".to_string())).await;
    let client = GatewayClient::new(gateway.config()).unwrap();

    let mut stream = client.stream_message(raw_request()).await.unwrap();
    while stream.next().await.is_some() {}

    let requests = gateway.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    assert_eq!(request.headers["x-api-key"], TEST_API_KEY);
    assert_eq!(request.headers["content-type"], "application/json");
    assert_eq!(request.headers["accept"], "text/event-stream");
    assert_eq!(request.headers["anthropic-version"], "2023-06-01");
    assert_eq!(
        request.body,
        json!({
            "model": "gpt-4o-mini",
            "max_tokens": 100,
            "messages": [{"role": "user", "content": "Hello! Give me a short response."}],
            "stream": true
        })
    );
}

/// Test that the Anthropic-format transcript decodes to data events then Done.
#[tokio::test]
async fn test_stream_decodes_anthropic_events() {
    let gateway = start_mock_gateway(Reply::Sse(anthropic_transcript())).await;
    let client = GatewayClient::new(gateway.config()).unwrap();

    let mut stream = client.stream_message(raw_request()).await.unwrap();
    assert_eq!(stream.status(), 200);
    assert!(stream.headers()["content-type"]
        .to_str()
        .unwrap()
        .contains("text/event-stream"));

    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event.unwrap());
    }

    assert_eq!(events.len(), 7);
    assert_eq!(events[0].as_data().unwrap()["type"], "message_start");
    assert_eq!(events[2].as_data().unwrap()["delta"]["text"], "Hello");
    assert!(events[6].is_done());
}

/// Test that raw frames include the `event:` lines the decoder skips.
#[tokio::test]
async fn test_frames_expose_raw_lines() {
    let gateway = start_mock_gateway(Reply::Sse(anthropic_transcript())).await;
    let client = GatewayClient::new(gateway.config()).unwrap();

    let mut stream = client.stream_message(raw_request()).await.unwrap();
    let first = stream.next_frame().await.unwrap().unwrap();
    assert_eq!(first.line, "event: message_start");
    assert!(first.event.is_none());

    let second = stream.next_frame().await.unwrap().unwrap();
    assert!(second.line.starts_with("data: "));
    assert!(matches!(second.event, Some(DecodedEvent::Data(_))));
}

/// Test that the stream returns as soon as `[DONE]` arrives, even when the
/// server keeps the connection open.
#[tokio::test]
async fn test_done_ends_stream_without_waiting_for_close() {
    let body = "data: {\"n\":1}\n\ndata: [DONE]\n\n".to_string();
    let gateway = start_mock_gateway(Reply::SseThenHang(body)).await;
    let client = GatewayClient::new(gateway.config()).unwrap();

    let mut stream = client.stream_message(raw_request()).await.unwrap();
    let events = tokio::time::timeout(Duration::from_secs(5), async {
        let mut events = Vec::new();
        while let Some(event) = stream.next().await {
            events.push(event.unwrap());
        }
        events
    })
    .await
    .expect("stream should end at [DONE] without waiting for the server");

    assert_eq!(
        events,
        vec![DecodedEvent::Data(json!({"n": 1})), DecodedEvent::Done]
    );
    assert!(stream.is_terminated());
}

/// Test that malformed lines over the wire are reported and skipped.
#[tokio::test]
async fn test_malformed_line_over_wire_is_not_fatal() {
    let body = "data: {broken\n\ndata: {\"ok\":1}\n\ndata: [DONE]\n\n".to_string();
    let gateway = start_mock_gateway(Reply::Sse(body)).await;
    let client = GatewayClient::new(gateway.config()).unwrap();

    let mut stream = client.stream_message(raw_request()).await.unwrap();
    let first = stream.next().await.unwrap().unwrap();
    assert!(matches!(first, DecodedEvent::Malformed { .. }));
    let second = stream.next().await.unwrap().unwrap();
    assert_eq!(second, DecodedEvent::Data(json!({"ok": 1})));
    assert!(stream.next().await.unwrap().unwrap().is_done());
    assert!(stream.next().await.is_none());
}

/// Test that a non-success status surfaces the code and body.
#[tokio::test]
async fn test_http_error_reports_status_and_body() {
    let gateway = start_mock_gateway(Reply::Status(
        axum::http::StatusCode::UNAUTHORIZED,
        "{\"error\":\"invalid api key\"}".to_string(),
    ))
    .await;
    let client = GatewayClient::new(gateway.config()).unwrap();

    let err = client.stream_message(raw_request()).await.unwrap_err();
    match err {
        ProbeError::Http { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid api key"));
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
    assert_eq!(gateway.requests().len(), 1, "errors are never retried");
}

/// Test that a refused connection is a transport error.
#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = gateway_probe::config::GatewayConfig::new(format!("http://{addr}"), "k");
    let client = GatewayClient::new(config).unwrap();
    let err = client.stream_message(raw_request()).await.unwrap_err();
    assert!(matches!(err, ProbeError::Transport(_)), "got {err:?}");
}

/// Test text extraction from the Anthropic-format stream.
#[tokio::test]
async fn test_text_stream_from_anthropic_events() {
    let gateway = start_mock_gateway(Reply::Sse(anthropic_transcript())).await;
    let client = GatewayClient::new(gateway.config()).unwrap();

    let text = client
        .text_stream(raw_request())
        .await
        .unwrap()
        .collect_text()
        .await
        .unwrap();
    assert_eq!(text, "Hello there!");
    assert_eq!(gateway.requests()[0].body["stream"], json!(true));
}

/// Test text extraction from raw OpenAI chunks with CRLF line endings.
#[tokio::test]
async fn test_text_stream_from_openai_chunks() {
    let gateway = start_mock_gateway(Reply::Sse(openai_transcript())).await;
    let client = GatewayClient::new(gateway.config()).unwrap();

    let mut stream = client.text_stream(raw_request()).await.unwrap();
    let mut pieces = Vec::new();
    while let Some(piece) = stream.next().await {
        pieces.push(piece.unwrap());
    }
    assert_eq!(pieces, vec!["Hi".to_string(), "!".to_string()]);
}

/// Test the `futures::Stream` view of a text stream.
#[tokio::test]
async fn test_text_stream_as_futures_stream() {
    let gateway = start_mock_gateway(Reply::Sse(openai_transcript())).await;
    let client = GatewayClient::new(gateway.config()).unwrap();

    let pieces: Vec<String> = client
        .text_stream(raw_request())
        .await
        .unwrap()
        .into_stream()
        .map(|piece| piece.unwrap())
        .collect()
        .await;
    assert_eq!(pieces, vec!["Hi".to_string(), "!".to_string()]);
}

/// Test the non-streaming Messages call.
#[tokio::test]
async fn test_create_message_parses_response() {
    let gateway = start_mock_gateway(Reply::Json(json!({
        "id": "msg_123",
        "type": "message",
        "role": "assistant",
        "model": "openai/gpt-4o-mini",
        "content": [{"type": "text", "text": "Hello! How can I help?"}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 9, "output_tokens": 7}
    })))
    .await;
    let client = GatewayClient::new(gateway.config()).unwrap();

    let request = MessagesRequestBuilder::new("openai/gpt-4o-mini")
        .user("Hello, Claude!")
        .stream(true)
        .build();
    let message = client.create_message(request).await.unwrap();

    assert_eq!(message.id, "msg_123");
    assert_eq!(message.first_text(), Some("Hello! How can I help?"));
    assert_eq!(message.usage.input_tokens, 9);

    let body = &gateway.requests()[0].body;
    assert!(body.get("stream").is_none(), "create_message never streams");
    assert_eq!(body["max_tokens"], json!(1024));
}

/// Test that a non-JSON success body is an InvalidJson error.
#[tokio::test]
async fn test_create_message_rejects_non_json() {
    let gateway = start_mock_gateway(Reply::Status(
        axum::http::StatusCode::OK,
        "not json".to_string(),
    ))
    .await;
    let client = GatewayClient::new(gateway.config()).unwrap();

    let err = client.create_message(raw_request()).await.unwrap_err();
    assert!(matches!(err, ProbeError::InvalidJson(_)));
}
