//! Streaming Reply Decoder
//!
//! Turns the raw byte chunks of a chat reply into newline-delimited JSON
//! records. Multi-byte UTF-8 sequences split across reads are carried over
//! to the next read, incomplete lines stay buffered, and the remainder is
//! flushed once the stream ends.

use serde::{Deserialize, Serialize};

// ============================================================================
// Types
// ============================================================================

/// One NDJSON record of a reply.
///
/// Streaming endpoints send `{"content": "..."}` per line; the single-shot
/// endpoint sends one `{"answer": "..."}` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecord {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

impl StreamRecord {
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            answer: None,
        }
    }

    /// Text to append to the bot bubble. Records with neither field add
    /// nothing.
    pub fn fragment(&self) -> &str {
        self.content
            .as_deref()
            .or(self.answer.as_deref())
            .unwrap_or("")
    }
}

/// Result of decoding one complete line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedLine {
    Record(StreamRecord),
    Malformed { line: String, error: String },
}

// ============================================================================
// Decoder
// ============================================================================

/// Incremental NDJSON decoder.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    /// Trailing bytes of an incomplete UTF-8 sequence.
    pending: Vec<u8>,
    /// Decoded text after the last newline.
    buffer: String,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw chunk and return every line it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<DecodedLine> {
        self.decode_utf8(chunk);

        let mut lines = Vec::new();
        while let Some(line_end) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=line_end).collect();
            if let Some(decoded) = parse_line(&line) {
                lines.push(decoded);
            }
        }
        lines
    }

    /// End of stream: decode whatever is left as a final record.
    pub fn finish(&mut self) -> Option<DecodedLine> {
        if !self.pending.is_empty() {
            let tail = std::mem::take(&mut self.pending);
            self.buffer.push_str(&String::from_utf8_lossy(&tail));
        }
        let rest = std::mem::take(&mut self.buffer);
        parse_line(&rest)
    }

    /// Text buffered but not yet terminated by a newline.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    fn decode_utf8(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        let bytes = std::mem::take(&mut self.pending);
        let mut rest = bytes.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    self.buffer.push_str(valid);
                    return;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    self.buffer
                        .push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(bad) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[bad..];
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more bytes
                            self.pending = after.to_vec();
                            return;
                        }
                    }
                }
            }
        }
    }
}

fn parse_line(raw: &str) -> Option<DecodedLine> {
    let line = raw.trim();
    if line.is_empty() {
        return None;
    }
    Some(match serde_json::from_str::<StreamRecord>(line) {
        Ok(record) => DecodedLine::Record(record),
        Err(e) => DecodedLine::Malformed {
            line: line.to_string(),
            error: e.to_string(),
        },
    })
}
