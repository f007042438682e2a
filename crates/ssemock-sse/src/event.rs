//! SSE event types and frame encoding.
//!
//! An [`SseEvent`] is a transient value: scripts build one, the stream
//! serializes it with [`SseEvent::to_bytes`] and the value is dropped.

use std::time::Duration;

use bytes::Bytes;

/// A Server-Sent Event.
///
/// Every field is optional. An event with no fields still serializes to a
/// single blank line, which flushes an event boundary on the client.
///
/// # Example
///
/// ```
/// use ssemock_sse::SseEvent;
///
/// let event = SseEvent::new("Chunk 1").event("chunk");
///
/// assert_eq!(event.to_sse_string(), "event: chunk\ndata: Chunk 1\n\n");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    /// Optional event type.
    event: Option<String>,
    /// Optional event ID.
    id: Option<String>,
    /// Optional reconnection delay hint.
    retry: Option<Duration>,
    /// Optional payload, may contain line breaks.
    data: Option<String>,
}

impl SseEvent {
    /// Create a new SSE event carrying the given data.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            ..Self::default()
        }
    }

    /// Create an event with no fields at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set the event type.
    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Set the event ID.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the retry interval.
    pub fn retry(mut self, retry: Duration) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Get the event type.
    pub fn event_type(&self) -> Option<&str> {
        self.event.as_deref()
    }

    /// Get the event ID.
    pub fn id_value(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Get the retry interval.
    pub fn retry_interval(&self) -> Option<Duration> {
        self.retry
    }

    /// Get the event data.
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Format the event as an SSE frame.
    ///
    /// Fields are written in the order `event`, `id`, `retry`, `data`:
    ///
    /// ```text
    /// event: <type>
    /// id: <id>
    /// retry: <ms>
    /// data: <data line 1>
    /// data: <data line 2>
    ///
    /// ```
    ///
    /// Empty `event`, `id` and `data` values are treated as absent, so an
    /// event built with `SseEvent::new("")` has no `data:` line. A `retry`
    /// of zero is still written.
    pub fn to_sse_string(&self) -> String {
        let mut result = String::new();

        if let Some(event) = non_empty(self.event.as_deref()) {
            result.push_str("event: ");
            result.push_str(event);
            result.push('\n');
        }

        if let Some(id) = non_empty(self.id.as_deref()) {
            result.push_str("id: ");
            result.push_str(id);
            result.push('\n');
        }

        if let Some(retry) = &self.retry {
            result.push_str("retry: ");
            result.push_str(&retry.as_millis().to_string());
            result.push('\n');
        }

        // Split on every '\n' so a trailing newline yields a final empty data line
        if let Some(data) = non_empty(self.data.as_deref()) {
            for line in data.split('\n') {
                result.push_str("data: ");
                result.push_str(line);
                result.push('\n');
            }
        }

        result.push('\n');

        result
    }

    /// Convert to bytes for sending.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.to_sse_string())
    }
}

impl From<String> for SseEvent {
    fn from(data: String) -> Self {
        Self::new(data)
    }
}

impl From<&str> for SseEvent {
    fn from(data: &str) -> Self {
        Self::new(data)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_new() {
        let event = SseEvent::new("hello");
        assert_eq!(event.data(), Some("hello"));
        assert_eq!(event.id_value(), None);
        assert_eq!(event.event_type(), None);
        assert_eq!(event.retry_interval(), None);
    }

    #[test]
    fn test_event_to_sse_string_simple() {
        let event = SseEvent::new("Event 1");
        assert_eq!(event.to_sse_string(), "data: Event 1\n\n");
    }

    #[test]
    fn test_event_field_order() {
        let event = SseEvent::new("hello")
            .id("1")
            .event("greeting")
            .retry(Duration::from_secs(5));

        assert_eq!(
            event.to_sse_string(),
            "event: greeting\nid: 1\nretry: 5000\ndata: hello\n\n"
        );
    }

    #[test]
    fn test_event_multiline_data() {
        let event = SseEvent::new("Line 1\nLine 2\nLine 3");
        assert_eq!(
            event.to_sse_string(),
            "data: Line 1\ndata: Line 2\ndata: Line 3\n\n"
        );
    }

    #[test]
    fn test_trailing_newline_yields_empty_data_line() {
        let event = SseEvent::new("tail\n");
        assert_eq!(event.to_sse_string(), "data: tail\ndata: \n\n");
    }

    #[test]
    fn test_empty_event_is_just_terminator() {
        assert_eq!(SseEvent::empty().to_sse_string(), "\n");
    }

    #[test]
    fn test_empty_data_is_omitted() {
        let event = SseEvent::new("").id("7");
        assert_eq!(event.to_sse_string(), "id: 7\n\n");
    }

    #[test]
    fn test_single_blank_line_forces_data_field() {
        // "\n" splits into two empty pieces
        let event = SseEvent::new("\n");
        assert_eq!(event.to_sse_string(), "data: \ndata: \n\n");
    }

    #[test]
    fn test_empty_type_and_id_are_omitted() {
        let event = SseEvent::new("x").event("").id("");
        assert_eq!(event.to_sse_string(), "data: x\n\n");
    }

    #[test]
    fn test_zero_retry_is_written() {
        let event = SseEvent::empty().retry(Duration::ZERO);
        assert_eq!(event.to_sse_string(), "retry: 0\n\n");
    }

    #[test]
    fn test_event_from_str() {
        let event: SseEvent = "hello".into();
        assert_eq!(event.data(), Some("hello"));
        assert_eq!(event.to_bytes(), Bytes::from_static(b"data: hello\n\n"));
    }
}
