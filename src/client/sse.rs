//! Async Server-Sent Events stream over an HTTP response body.
//!
//! Splits the body into lines and runs each one through a
//! [`LineDecoder`](crate::sse::LineDecoder). Nothing is spawned: every call to
//! [`SseStream::next`] awaits the next body chunk on the caller's task.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{BoxStream, Stream, StreamExt};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use crate::error::{ProbeError, ProbeResult};
use crate::sse::{trim_line_ending, DecodedEvent, LineDecoder};
use crate::types::{is_message_stop, text_delta};

/// One non-blank line of the body and the event it decoded to, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// The raw line, without its line ending.
    pub line: String,
    /// `None` for non-data lines (`event:`, `id:`, comments).
    pub event: Option<DecodedEvent>,
}

/// A stream of decoded events from one streaming HTTP call.
///
/// Forward-only and not restartable. After the `[DONE]` sentinel the body is
/// dropped, which releases the connection; dropping the stream early does the
/// same.
///
/// # Example
///
/// ```no_run
/// # async fn example(mut stream: gateway_probe::client::SseStream) {
/// use gateway_probe::sse::DecodedEvent;
///
/// while let Some(event) = stream.next().await {
///     match event {
///         Ok(DecodedEvent::Data(value)) => println!("{value}"),
///         Ok(DecodedEvent::Malformed { error, .. }) => eprintln!("bad line: {error}"),
///         Ok(DecodedEvent::Done) => println!("done"),
///         Err(e) => eprintln!("stream error: {e}"),
///     }
/// }
/// # }
/// ```
pub struct SseStream {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<BoxStream<'static, ProbeResult<Vec<u8>>>>,
    buffer: Vec<u8>,
    decoder: LineDecoder,
}

impl std::fmt::Debug for SseStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SseStream")
            .field("status", &self.status)
            .field("terminated", &self.decoder.is_terminated())
            .finish_non_exhaustive()
    }
}

impl SseStream {
    /// Create an `SseStream` from a successful `reqwest::Response`.
    pub(crate) fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| ProbeError::Transport(format!("error reading SSE stream: {e}")))
            })
            .boxed();

        Self {
            status,
            headers,
            body: Some(body),
            buffer: Vec::new(),
            decoder: LineDecoder::new(),
        }
    }

    /// Create an `SseStream` from any stream of body chunks.
    ///
    /// Useful for replaying a captured body or for test transports. Status is
    /// reported as `200 OK` with no headers.
    pub fn from_byte_stream<S>(chunks: S) -> Self
    where
        S: Stream<Item = ProbeResult<Vec<u8>>> + Send + 'static,
    {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Some(chunks.boxed()),
            buffer: Vec::new(),
            decoder: LineDecoder::new(),
        }
    }

    /// HTTP status of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// HTTP headers of the response.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether the `[DONE]` sentinel has been seen.
    pub fn is_terminated(&self) -> bool {
        self.decoder.is_terminated()
    }

    /// Get the next non-blank line together with its decoded event.
    ///
    /// Returns `None` once the sentinel has been decoded or the body has ended.
    pub async fn next_frame(&mut self) -> Option<ProbeResult<Frame>> {
        loop {
            if self.decoder.is_terminated() {
                return None;
            }

            if let Some(line) = self.take_line() {
                if let Some(frame) = self.decode(&line) {
                    return Some(Ok(frame));
                }
                continue;
            }

            let chunk = self.body.as_mut()?.next().await;
            match chunk {
                Some(Ok(chunk)) => self.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    self.close();
                    return Some(Err(e));
                }
                None => {
                    self.body = None;
                    // Final line without a trailing newline.
                    let rest = std::mem::take(&mut self.buffer);
                    return self.decode(trim_line_ending(&rest)).map(Ok);
                }
            }
        }
    }

    /// Get the next decoded event, skipping non-data lines.
    pub async fn next(&mut self) -> Option<ProbeResult<DecodedEvent>> {
        loop {
            match self.next_frame().await? {
                Ok(Frame {
                    event: Some(event), ..
                }) => return Some(Ok(event)),
                Ok(Frame { event: None, .. }) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }

    /// Convert this stream into a `futures::Stream` of decoded events.
    pub fn into_stream(self) -> impl Stream<Item = ProbeResult<DecodedEvent>> + Send {
        futures::stream::unfold(self, |mut stream| async move {
            let item = stream.next().await?;
            Some((item, stream))
        })
    }

    /// Narrow this stream to text deltas.
    pub fn into_text_stream(self) -> TextStream {
        TextStream {
            inner: self,
            finished: false,
        }
    }

    fn take_line(&mut self) -> Option<Vec<u8>> {
        let newline = self.buffer.iter().position(|b| *b == b'\n')?;
        let mut line: Vec<u8> = self.buffer.drain(..=newline).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }

    fn decode(&mut self, line: &[u8]) -> Option<Frame> {
        let text = String::from_utf8_lossy(line);
        if text.trim().is_empty() {
            return None;
        }
        tracing::trace!(line = %text, "SSE line");
        let event = self.decoder.decode_line(&text);
        if let Some(DecodedEvent::Done) = event {
            tracing::debug!("SSE stream reached [DONE]; releasing connection");
            self.close();
        }
        Some(Frame {
            line: text.into_owned(),
            event,
        })
    }

    fn close(&mut self) {
        self.body = None;
        self.buffer.clear();
    }
}

/// A stream of text deltas from either vendor chunk format.
///
/// Ends on `[DONE]`, on an Anthropic `message_stop` event, or at end of body.
/// Malformed lines are logged and skipped.
#[derive(Debug)]
pub struct TextStream {
    inner: SseStream,
    finished: bool,
}

impl TextStream {
    /// Get the next piece of text.
    pub async fn next(&mut self) -> Option<ProbeResult<String>> {
        while !self.finished {
            match self.inner.next().await {
                Some(Ok(DecodedEvent::Data(value))) => {
                    if let Some(text) = text_delta(&value) {
                        return Some(Ok(text.to_string()));
                    }
                    if is_message_stop(&value) {
                        self.finished = true;
                    }
                }
                Some(Ok(DecodedEvent::Malformed { error, payload })) => {
                    tracing::warn!(%error, %payload, "skipping malformed SSE payload");
                }
                Some(Ok(DecodedEvent::Done)) | None => self.finished = true,
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }

    /// Drain the stream, concatenating every delta.
    pub async fn collect_text(mut self) -> ProbeResult<String> {
        let mut text = String::new();
        while let Some(delta) = self.next().await {
            text.push_str(&delta?);
        }
        Ok(text)
    }

    /// Response status of the underlying call.
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    /// Convert this stream into a `futures::Stream` of text deltas.
    pub fn into_stream(self) -> TextStreamAdapter {
        let inner = futures::stream::unfold(self, |mut stream| async move {
            let item = stream.next().await?;
            Some((item, stream))
        });
        TextStreamAdapter {
            inner: Box::pin(inner),
        }
    }
}

/// Adapter that implements `futures::Stream` for a [`TextStream`].
pub struct TextStreamAdapter {
    inner: Pin<Box<dyn Stream<Item = ProbeResult<String>> + Send>>,
}

impl Stream for TextStreamAdapter {
    type Item = ProbeResult<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
