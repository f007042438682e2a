//! # ssemock SSE
//!
//! Server-Sent Events framing for the ssemock test server.
//!
//! This crate turns logical events into the exact bytes a conformant SSE
//! client must accept, and plays back endpoint scripts as paced streams.
//!
//! ## Features
//!
//! - **Frame encoding**: [`SseEvent`] serializes `event`, `id`, `retry` and
//!   multi-line `data` fields, always ending with a blank line
//! - **Scripted streams**: [`ScriptStream`] yields one frame per emit action,
//!   pauses through an injectable [`Clock`], and can close early
//! - **Decoding**: [`EventDecoder`] parses frames back into events the way a
//!   browser `EventSource` does
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ssemock_sse::{Action, ScriptStream, SseEvent, TokioClock};
//!
//! let stream = ScriptStream::new(
//!     vec![
//!         Action::emit(SseEvent::new("Chunk 1").event("chunk")),
//!         Action::sleep_ms(50),
//!         Action::emit(SseEvent::new("Chunk 2").event("chunk")),
//!     ],
//!     Arc::new(TokioClock),
//! )
//! .with_label("/chat");
//!
//! let headers = ssemock_sse::sse_headers();
//! assert_eq!(headers["content-type"], "text/event-stream");
//! # drop(stream);
//! ```
//!
//! ## SSE Protocol
//!
//! ```text
//! event: chunk
//! id: msg-001
//! retry: 5000
//! data: first line
//! data: second line
//!
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod clock;
mod decoder;
mod event;
mod stream;

pub use clock::{Clock, InstantClock, Sleep, TokioClock};
pub use decoder::{EventDecoder, ReceivedEvent, DEFAULT_EVENT_TYPE};
pub use event::SseEvent;
pub use stream::{Action, CloseHook, ScriptStream, StreamState};

/// MIME type of an event stream.
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Headers sent with every successful event-stream response.
pub fn sse_headers() -> http::HeaderMap {
    let mut headers = http::HeaderMap::new();
    headers.insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static(EVENT_STREAM_CONTENT_TYPE),
    );
    headers.insert(
        http::header::CACHE_CONTROL,
        http::HeaderValue::from_static("no-cache"),
    );
    headers.insert(
        http::header::CONNECTION,
        http::HeaderValue::from_static("keep-alive"),
    );
    headers
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::clock::{Clock, InstantClock, TokioClock};
    pub use crate::decoder::{EventDecoder, ReceivedEvent};
    pub use crate::event::SseEvent;
    pub use crate::stream::{Action, ScriptStream, StreamState};
}
