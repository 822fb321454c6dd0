//! Incremental decoder for the `text/event-stream` wire format.
//!
//! Pure and socket-free: feed it byte chunks as they arrive and collect
//! dispatched frames. Field lines (`event:`, `data:`, `id:`, `retry:`)
//! accumulate until a blank line dispatches the frame; `:` comment lines
//! are ignored; multi-line data joins with `\n`; CRLF is tolerated.

use std::time::Duration;

/// One dispatched server-sent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// The `event:` name, if the server set one.
    pub event: Option<String>,
    /// Joined `data:` lines.
    pub data: String,
    /// The `id:` field, if present.
    pub id: Option<String>,
    /// A `retry:` reconnection-delay override.
    pub retry: Option<Duration>,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
    id: Option<String>,
    retry: Option<Duration>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one transport chunk and return every frame it completed.
    ///
    /// Bytes are buffered until a full line is available, so chunk
    /// boundaries may fall anywhere, including inside a UTF-8 sequence.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some(newline) = self.buf.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buf.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                if let Some(frame) = self.dispatch() {
                    frames.push(frame);
                }
            } else {
                self.field(line);
            }
        }
        frames
    }

    fn field(&mut self, line: &str) {
        if line.starts_with(':') {
            return;
        }
        let (name, value) = match line.split_once(':') {
            Some((name, value)) => (name, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match name {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            "retry" => {
                if let Ok(ms) = value.parse::<u64>() {
                    self.retry = Some(Duration::from_millis(ms));
                }
            }
            _ => {}
        }
    }

    /// A blank line ends the frame. Frames with no data lines are not
    /// dispatched unless they carry a `retry:` override the connection
    /// loop must see.
    fn dispatch(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        let id = self.id.take();
        let retry = self.retry.take();
        if self.data.is_empty() && retry.is_none() {
            return None;
        }
        Some(SseFrame {
            event,
            data: std::mem::take(&mut self.data).join("\n"),
            id,
            retry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_named_event() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"event: graph\ndata: {\"workingSnapshots\":[]}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("graph"));
        assert_eq!(frames[0].data, "{\"workingSnapshots\":[]}");
    }

    #[test]
    fn reassembles_frames_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"event: gra").is_empty());
        assert!(decoder.feed(b"ph\ndata: {\"a\":").is_empty());
        let frames = decoder.feed(b"1}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("graph"));
        assert_eq!(frames[0].data, "{\"a\":1}");
    }

    #[test]
    fn joins_multi_line_data() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"data: line one\ndata: line two\n\n");
        assert_eq!(frames[0].data, "line one\nline two");
    }

    #[test]
    fn ignores_comment_lines() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b": keep-alive\n\ndata: x\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "x");
    }

    #[test]
    fn tolerates_crlf() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"event: graph\r\ndata: x\r\n\r\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("graph"));
        assert_eq!(frames[0].data, "x");
    }

    #[test]
    fn retry_only_frame_is_surfaced() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.feed(b"retry: 5000\n\n");
        assert_eq!(frames.len(), 1);
        assert!(frames[0].data.is_empty());
        assert_eq!(frames[0].retry, Some(Duration::from_millis(5000)));
    }

    #[test]
    fn blank_line_without_fields_dispatches_nothing() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"\n\n\n").is_empty());
    }

    #[test]
    fn field_without_colon_is_a_bare_name() {
        let mut decoder = SseDecoder::new();
        // Per the wire format a lone "data" line contributes an empty line.
        let frames = decoder.feed(b"data\ndata: x\n\n");
        assert_eq!(frames[0].data, "\nx");
    }

    #[test]
    fn consecutive_frames_do_not_leak_fields() {
        let mut decoder = SseDecoder::new();
        let first = decoder.feed(b"event: graph\nid: 1\ndata: a\n\n");
        assert_eq!(first[0].id.as_deref(), Some("1"));
        let second = decoder.feed(b"data: b\n\n");
        assert_eq!(second[0].event, None);
        assert_eq!(second[0].id, None);
        assert_eq!(second[0].data, "b");
    }
}
