//! Scripted SSE streams.
//!
//! A [`ScriptStream`] walks an ordered list of [`Action`]s and yields one
//! encoded frame per emitted event. Pauses are delegated to a [`Clock`]; a
//! [`Action::Close`] ends the stream and fires the close hook so the
//! transport can tear the connection down.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures_util::Stream;

use crate::clock::{Clock, Sleep};
use crate::event::SseEvent;

/// One step of an endpoint script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Encode and send an event.
    Emit(SseEvent),
    /// Pause before the next action.
    Sleep(Duration),
    /// End the stream and ask the transport to close the connection.
    Close,
}

impl Action {
    /// Create an emit action.
    pub fn emit(event: impl Into<SseEvent>) -> Self {
        Self::Emit(event.into())
    }

    /// Create a pause of `ms` milliseconds.
    pub fn sleep_ms(ms: u64) -> Self {
        Self::Sleep(Duration::from_millis(ms))
    }
}

/// Lifecycle of a scripted stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Created, headers not yet sent, body not yet polled.
    HeadersPending,
    /// Body is being produced.
    Streaming,
    /// Script ran out of actions.
    Completed,
    /// Script closed the connection explicitly.
    ClosedEarly,
}

impl StreamState {
    /// Whether the stream has ended, either way.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::ClosedEarly)
    }
}

/// Callback fired when a script closes its connection.
pub type CloseHook = Box<dyn FnOnce() + Send>;

/// A stream of SSE frames driven by a script.
///
/// Each emitted event is yielded as its own chunk, and the next action does
/// not run until the consumer polls again, so frames leave strictly in script
/// order. Dropping the stream mid-script (the peer went away) is not an
/// error; it is logged at `debug` and the remaining actions are discarded.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use futures_util::StreamExt;
/// use ssemock_sse::{Action, InstantClock, ScriptStream, SseEvent};
///
/// # tokio_test::block_on(async {
/// let actions = vec![
///     Action::emit("one"),
///     Action::sleep_ms(100),
///     Action::emit(SseEvent::new("two").id("2")),
/// ];
/// let stream = ScriptStream::new(actions, Arc::new(InstantClock));
/// let frames: Vec<_> = stream.map(Result::unwrap).collect().await;
///
/// assert_eq!(frames.len(), 2);
/// assert_eq!(&frames[1][..], b"id: 2\ndata: two\n\n");
/// # });
/// ```
pub struct ScriptStream {
    actions: std::vec::IntoIter<Action>,
    clock: Arc<dyn Clock>,
    sleep: Option<Sleep>,
    state: StreamState,
    on_close: Option<CloseHook>,
    label: String,
    summary: Option<String>,
    events_sent: usize,
}

impl ScriptStream {
    /// Create a stream over `actions`, pacing with `clock`.
    pub fn new(actions: Vec<Action>, clock: Arc<dyn Clock>) -> Self {
        Self {
            actions: actions.into_iter(),
            clock,
            sleep: None,
            state: StreamState::HeadersPending,
            on_close: None,
            label: String::new(),
            summary: None,
            events_sent: 0,
        }
    }

    /// Set the label used in log records, usually the request path.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the message logged when the script finishes.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Register the hook fired on [`Action::Close`].
    pub fn on_close(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(hook));
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Number of events yielded so far.
    pub fn events_sent(&self) -> usize {
        self.events_sent
    }

    fn finish(&mut self, state: StreamState) {
        self.state = state;
        self.sleep = None;

        let summary = self.summary.as_deref().unwrap_or("Stream finished");
        tracing::info!(
            http.path = %self.label,
            events = self.events_sent,
            closed_early = state == StreamState::ClosedEarly,
            "{}",
            summary
        );

        if state == StreamState::ClosedEarly {
            if let Some(hook) = self.on_close.take() {
                hook();
            }
        }
    }
}

impl fmt::Debug for ScriptStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptStream")
            .field("label", &self.label)
            .field("state", &self.state)
            .field("events_sent", &self.events_sent)
            .field("remaining", &self.actions.len())
            .finish_non_exhaustive()
    }
}

impl Stream for ScriptStream {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        if this.state.is_finished() {
            return Poll::Ready(None);
        }
        this.state = StreamState::Streaming;

        loop {
            if let Some(sleep) = this.sleep.as_mut() {
                ready!(sleep.as_mut().poll(cx));
                this.sleep = None;
            }

            match this.actions.next() {
                Some(Action::Emit(event)) => {
                    this.events_sent += 1;
                    return Poll::Ready(Some(Ok(event.to_bytes())));
                }
                Some(Action::Sleep(duration)) => {
                    this.sleep = Some(this.clock.sleep(duration));
                }
                Some(Action::Close) => {
                    this.finish(StreamState::ClosedEarly);
                    return Poll::Ready(None);
                }
                None => {
                    this.finish(StreamState::Completed);
                    return Poll::Ready(None);
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.state.is_finished() {
            (0, Some(0))
        } else {
            (0, Some(self.actions.len()))
        }
    }
}

impl Drop for ScriptStream {
    fn drop(&mut self) {
        if self.state == StreamState::Streaming {
            tracing::debug!(
                http.path = %self.label,
                events = self.events_sent,
                "Client disconnected mid-stream"
            );
        }
    }
}
