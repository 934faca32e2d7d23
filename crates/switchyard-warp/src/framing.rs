//! Event-stream framing.
//!
//! The upstream answers with `text/event-stream` where every record is a
//! single `data: <base64 ResponseEvent>` line. Records can straddle network
//! reads, so bytes are buffered until a newline shows up; the tail left at
//! end of stream is flushed by [`LineBuffer::finish`].

use crate::codec::WireCodec;
use crate::error::CodecError;
use crate::events::{parse_response_event, WarpEvent};
use crate::tools::ToolMapper;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use bytes::{Buf, BytesMut};
use tracing::{debug, warn};

/// Splits a byte stream into lines. `\r\n` and `\n` both terminate a line.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: BytesMut,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line = self.pending.split_to(pos);
            self.pending.advance(1);
            lines.push(to_line(&line));
        }
        lines
    }

    /// Flush the unterminated tail, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = self.pending.split();
        Some(to_line(&rest))
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

fn to_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Payload of a `data:` line, trimmed. `None` for other lines and empty payloads.
pub fn data_payload(line: &str) -> Option<&str> {
    let payload = line.strip_prefix("data:")?.trim();
    (!payload.is_empty()).then_some(payload)
}

/// Decode base64 the way the upstream emits it, padded or not, either alphabet.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, CodecError> {
    STANDARD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .or_else(|_| URL_SAFE.decode(payload))
        .or_else(|_| URL_SAFE_NO_PAD.decode(payload))
        .map_err(|e| CodecError::Decoding(format!("invalid base64 payload: {}", e)))
}

/// Bytes in, [`WarpEvent`]s out. Malformed frames are logged and skipped.
#[derive(Debug)]
pub struct FrameDecoder {
    lines: LineBuffer,
    codec: WireCodec,
    mapper: ToolMapper,
    frames: usize,
    skipped: usize,
}

impl FrameDecoder {
    pub fn new(codec: WireCodec, mapper: ToolMapper) -> Self {
        Self {
            lines: LineBuffer::new(),
            codec,
            mapper,
            frames: 0,
            skipped: 0,
        }
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<WarpEvent> {
        let lines = self.lines.push(chunk);
        let mut events = Vec::new();
        for line in lines {
            events.extend(self.decode_line(&line));
        }
        events
    }

    /// Decode whatever is left once the transport closes.
    pub fn finish(&mut self) -> Vec<WarpEvent> {
        match self.lines.finish() {
            Some(line) => self.decode_line(&line),
            None => Vec::new(),
        }
    }

    /// `data:` records seen so far, malformed ones included.
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn decode_line(&mut self, line: &str) -> Vec<WarpEvent> {
        let Some(payload) = data_payload(line) else {
            return Vec::new();
        };
        let frame_index = self.frames;
        self.frames += 1;

        match self.decode_frame(payload) {
            Ok(events) => {
                debug!(frame_index, events = events.len(), "decoded frame");
                events
            }
            Err(err) => {
                self.skipped += 1;
                warn!(frame_index, error = %err, "skipping malformed frame");
                Vec::new()
            }
        }
    }

    fn decode_frame(&self, payload: &str) -> Result<Vec<WarpEvent>, CodecError> {
        let bytes = decode_base64(payload)?;
        let event = self.codec.parse_response_event(&bytes)?;
        Ok(parse_response_event(&event, &self.mapper))
    }
}
