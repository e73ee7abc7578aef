//! Line-at-a-time Server-Sent Events decoding.
//!
//! Turns raw response-body lines into [`DecodedEvent`]s. Only `data: ` lines
//! are considered; every other SSE field (`event:`, `id:`, `retry:`, comments)
//! is dropped. Each line is decoded independently: multi-line `data:`
//! continuations are not coalesced into one frame.
//!
//! Decoding stops for good at the first `data: [DONE]` line.
//!
//! # Example
//!
//! ```
//! use gateway_probe::sse::{decode_lines, DecodedEvent};
//!
//! let lines = ["data: {\"x\":1}", "", "data: [DONE]", "data: {\"y\":2}"];
//! let events: Vec<_> = decode_lines(lines).collect();
//! assert_eq!(events.len(), 2);
//! assert_eq!(events[0], DecodedEvent::Data(serde_json::json!({"x": 1})));
//! assert_eq!(events[1], DecodedEvent::Done);
//! ```

use std::io::BufRead;

use serde_json::Value;

use crate::error::{ProbeError, ProbeResult};

/// Prefix that marks a data frame. Byte-exact, space included.
pub const DATA_PREFIX: &str = "data: ";

/// Payload that signals the end of the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// A single event decoded from a `data: ` line.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedEvent {
    /// The `[DONE]` sentinel. Nothing after it is read.
    Done,
    /// A payload that parsed as JSON.
    Data(Value),
    /// A payload that failed to parse. Recoverable: decoding continues.
    Malformed {
        /// Parser error description.
        error: String,
        /// The payload text that failed to parse.
        payload: String,
    },
}

impl DecodedEvent {
    /// Returns `true` for the termination event.
    pub fn is_done(&self) -> bool {
        matches!(self, DecodedEvent::Done)
    }

    /// Returns the parsed value for [`DecodedEvent::Data`].
    pub fn as_data(&self) -> Option<&Value> {
        match self {
            DecodedEvent::Data(value) => Some(value),
            _ => None,
        }
    }
}

/// Decoder lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderState {
    /// Accepting lines.
    #[default]
    Consuming,
    /// The sentinel was seen; all further input is ignored.
    Terminated,
}

/// Stateful single-line decoder.
///
/// Holds no buffer beyond the line being decoded; the only state is whether
/// the sentinel has been seen.
#[derive(Debug, Clone, Default)]
pub struct LineDecoder {
    state: DecoderState,
}

impl LineDecoder {
    /// Create a decoder in the [`DecoderState::Consuming`] state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DecoderState {
        self.state
    }

    /// Whether the `[DONE]` sentinel has been decoded.
    pub fn is_terminated(&self) -> bool {
        self.state == DecoderState::Terminated
    }

    /// Decode one line of text.
    ///
    /// A single trailing `\n`, `\r\n` or `\r` is ignored; any other trailing
    /// whitespace is part of the payload. Returns `None` for blank lines,
    /// non-data lines, and any line after the sentinel.
    pub fn decode_line(&mut self, line: &str) -> Option<DecodedEvent> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        if self.is_terminated() || line.trim().is_empty() {
            return None;
        }

        let payload = line.strip_prefix(DATA_PREFIX)?;

        if payload == DONE_SENTINEL {
            self.state = DecoderState::Terminated;
            return Some(DecodedEvent::Done);
        }

        Some(match serde_json::from_str::<Value>(payload) {
            Ok(value) => DecodedEvent::Data(value),
            Err(e) => DecodedEvent::Malformed {
                error: e.to_string(),
                payload: payload.to_string(),
            },
        })
    }

    /// Decode one line of raw bytes as UTF-8.
    ///
    /// Invalid sequences are replaced with U+FFFD rather than rejected.
    pub fn decode_bytes(&mut self, line: &[u8]) -> Option<DecodedEvent> {
        self.decode_line(&String::from_utf8_lossy(line))
    }
}

/// Lazy iterator of decoded events over a source of lines.
///
/// Created by [`decode_lines`] and [`decode_reader`]. Once [`DecodedEvent::Done`]
/// has been yielded the source is never pulled again.
#[derive(Debug)]
pub struct Events<I> {
    lines: I,
    decoder: LineDecoder,
}

impl<I> Events<I> {
    /// Whether the sentinel has been reached.
    pub fn is_terminated(&self) -> bool {
        self.decoder.is_terminated()
    }
}

/// Decode an iterator of lines into an iterator of events.
pub fn decode_lines<I>(lines: I) -> Events<I::IntoIter>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    Events {
        lines: lines.into_iter(),
        decoder: LineDecoder::new(),
    }
}

impl<I> Iterator for Events<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = DecodedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.decoder.is_terminated() {
            return None;
        }
        for line in self.lines.by_ref() {
            if let Some(event) = self.decoder.decode_line(line.as_ref()) {
                return Some(event);
            }
        }
        None
    }
}

/// Lazy iterator of decoded events over a blocking reader.
///
/// Read errors are yielded once as `Err` and end the sequence.
#[derive(Debug)]
pub struct ReaderEvents<R> {
    reader: R,
    decoder: LineDecoder,
    buf: Vec<u8>,
    failed: bool,
}

/// Decode a blocking reader (file, stdin, socket) line by line.
pub fn decode_reader<R: BufRead>(reader: R) -> ReaderEvents<R> {
    ReaderEvents {
        reader,
        decoder: LineDecoder::new(),
        buf: Vec::new(),
        failed: false,
    }
}

impl<R: BufRead> Iterator for ReaderEvents<R> {
    type Item = ProbeResult<DecodedEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.failed && !self.decoder.is_terminated() {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {
                    let line = trim_line_ending(&self.buf);
                    if let Some(event) = self.decoder.decode_bytes(line) {
                        return Some(Ok(event));
                    }
                }
                Err(e) => {
                    self.failed = true;
                    return Some(Err(ProbeError::from(e)));
                }
            }
        }
        None
    }
}

/// Strip a trailing `\n` or `\r\n`.
pub(crate) fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
