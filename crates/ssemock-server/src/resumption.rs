//! Resumption state for `/events-with-id`.
//!
//! The decision of which event to send is a pure function of the
//! `Last-Event-ID` header the client presents. The state only records the
//! last ID issued so tests and operators can query it.

use parking_lot::RwLock;
use ssemock_sse::SseEvent;

/// `Last-Event-ID` value that triggers the resumed branch.
pub const RESUME_AFTER_ID: &str = "100";

/// ID of the event sent to a fresh client.
pub const FIRST_EVENT_ID: &str = "100";

/// ID of the event sent to a resuming client.
pub const RESUMED_EVENT_ID: &str = "101";

/// Process-wide resumption state.
///
/// Shared across sessions behind an `Arc`. It is global rather than
/// per-client: the mock exists to exercise the client's `Last-Event-ID`
/// handling, not to model multiple tenants.
///
/// # Example
///
/// ```
/// use ssemock_server::ResumptionState;
///
/// let state = ResumptionState::new();
///
/// let first = state.check_and_advance(None);
/// assert_eq!(first.id_value(), Some("100"));
///
/// let resumed = state.check_and_advance(Some("100"));
/// assert_eq!(resumed.id_value(), Some("101"));
/// assert_eq!(state.last_issued().as_deref(), Some("101"));
/// ```
#[derive(Debug, Default)]
pub struct ResumptionState {
    last_issued: RwLock<Option<String>>,
}

impl ResumptionState {
    /// Creates empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates state that already records `id` as issued.
    pub fn seeded(id: impl Into<String>) -> Self {
        Self {
            last_issued: RwLock::new(Some(id.into())),
        }
    }

    /// Picks the event for a request carrying `last_event_id`.
    ///
    /// Does not touch the state.
    pub fn decide(last_event_id: Option<&str>) -> SseEvent {
        if last_event_id == Some(RESUME_AFTER_ID) {
            SseEvent::new("resumed").id(RESUMED_EVENT_ID)
        } else {
            SseEvent::new("first").id(FIRST_EVENT_ID)
        }
    }

    /// Picks the event for `last_event_id` and records its ID as issued.
    pub fn check_and_advance(&self, last_event_id: Option<&str>) -> SseEvent {
        let event = Self::decide(last_event_id);
        *self.last_issued.write() = event.id_value().map(str::to_string);
        event
    }

    /// The ID most recently issued, if any.
    pub fn last_issued(&self) -> Option<String> {
        self.last_issued.read().clone()
    }

    /// Overwrites the recorded ID.
    pub fn seed(&self, id: impl Into<String>) {
        *self.last_issued.write() = Some(id.into());
    }

    /// Forgets the recorded ID.
    pub fn reset(&self) {
        *self.last_issued.write() = None;
    }
}
