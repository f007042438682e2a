//! Client-side SSE decoding.
//!
//! [`EventDecoder`] reconstructs logical events from a byte stream the way a
//! conformant `EventSource` client does. The mock uses it to check its own
//! frames; it is also handy in client-facing test harnesses.

use std::mem;

/// Default event type assigned when a frame has no `event:` field.
pub const DEFAULT_EVENT_TYPE: &str = "message";

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// An event as seen by a client after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedEvent {
    /// Event type, `"message"` when the frame had none.
    pub event_type: String,
    /// Reconstructed data, multiple `data:` lines joined with `\n`.
    pub data: String,
    /// Last event ID in effect when this event was dispatched.
    pub id: String,
    /// Reconnection delay carried by this event, in milliseconds.
    pub retry: Option<u64>,
}

#[derive(Debug, Default)]
struct PendingEvent {
    event_type: String,
    data: String,
    retry: Option<u64>,
}

/// Incremental SSE decoder.
///
/// Feed it arbitrary chunks; complete events become available through
/// [`take_events`](Self::take_events). Lines may end in `\n`, `\r` or `\r\n`,
/// including a `\r\n` pair split across two chunks.
///
/// # Example
///
/// ```
/// use ssemock_sse::EventDecoder;
///
/// let mut decoder = EventDecoder::new();
/// decoder.feed(b"id: 7\ndata: Line 1\n");
/// decoder.feed(b"data: Line 2\n\n");
///
/// let events = decoder.take_events();
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].data, "Line 1\nLine 2");
/// assert_eq!(events[0].id, "7");
/// ```
#[derive(Debug, Default)]
pub struct EventDecoder {
    buffer: Vec<u8>,
    current: PendingEvent,
    pending: Vec<ReceivedEvent>,
    last_event_id: String,
    bom_checked: bool,
    trailing_cr: bool,
}

impl EventDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a complete body in one go.
    pub fn decode_all(bytes: &[u8]) -> Vec<ReceivedEvent> {
        let mut decoder = Self::new();
        decoder.feed(bytes);
        decoder.take_events()
    }

    /// Feed a chunk of bytes.
    ///
    /// A leading byte-order mark is dropped even when it arrives split
    /// across several chunks.
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.bom_checked {
            self.feed_lines(chunk);
            return;
        }

        self.buffer.extend_from_slice(chunk);
        if self.buffer.len() < BOM.len() && BOM.starts_with(&self.buffer) {
            return;
        }

        self.bom_checked = true;
        let mut head = mem::take(&mut self.buffer);
        if head.starts_with(BOM) {
            head.drain(..BOM.len());
        }
        self.feed_lines(&head);
    }

    fn feed_lines(&mut self, chunk: &[u8]) {
        let mut input = chunk;

        // Second half of a "\r\n" that straddled the previous chunk
        if self.trailing_cr && !input.is_empty() {
            self.trailing_cr = false;
            if input[0] == b'\n' {
                input = &input[1..];
            }
        }

        self.buffer.extend_from_slice(input);

        let mut pos = 0;
        while let Some(offset) = self.buffer[pos..]
            .iter()
            .position(|&b| b == b'\r' || b == b'\n')
        {
            let end = pos + offset;
            let skip = if self.buffer[end] == b'\r' {
                match self.buffer.get(end + 1) {
                    Some(b'\n') => 2,
                    Some(_) => 1,
                    None => {
                        self.trailing_cr = true;
                        1
                    }
                }
            } else {
                1
            };

            let line = String::from_utf8_lossy(&self.buffer[pos..end]).into_owned();
            pos = end + skip;
            self.process_line(&line);
        }

        self.buffer.drain(..pos);
    }

    /// Take all events dispatched so far.
    pub fn take_events(&mut self) -> Vec<ReceivedEvent> {
        mem::take(&mut self.pending)
    }

    /// Whether any dispatched events are waiting to be taken.
    pub fn has_events(&self) -> bool {
        !self.pending.is_empty()
    }

    /// The last event ID seen, as a reconnecting client would send it.
    pub fn last_event_id(&self) -> &str {
        &self.last_event_id
    }

    /// Forget all state, including the last event ID.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn process_line(&mut self, line: &str) {
        if line.is_empty() {
            self.dispatch();
            return;
        }

        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.current.event_type = value.to_string(),
            "data" => {
                self.current.data.push_str(value);
                self.current.data.push('\n');
            }
            "id" => {
                if !value.contains('\0') {
                    self.last_event_id = value.to_string();
                }
            }
            "retry" => {
                if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
                    if let Ok(ms) = value.parse() {
                        self.current.retry = Some(ms);
                    }
                }
            }
            _ => {}
        }
    }

    fn dispatch(&mut self) {
        let mut current = mem::take(&mut self.current);

        if current.data.ends_with('\n') {
            current.data.pop();
        }

        if current.data.is_empty() {
            return;
        }

        let event_type = if current.event_type.is_empty() {
            DEFAULT_EVENT_TYPE.to_string()
        } else {
            current.event_type
        };

        self.pending.push(ReceivedEvent {
            event_type,
            data: current.data,
            id: self.last_event_id.clone(),
            retry: current.retry,
        });
    }
}
