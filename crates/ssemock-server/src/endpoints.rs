//! The fixed catalogue of mock endpoints and their scripts.
//!
//! Each [`Endpoint`] is bound to one method and one exact path. Given the
//! incoming request it produces a [`Script`]: either a sequence of stream
//! actions or a single non-SSE response.

use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use ssemock_sse::{Action, SseEvent};

use crate::resumption::ResumptionState;

/// Pause between events on the paced endpoints.
pub const EVENT_INTERVAL: Duration = Duration::from_millis(100);

/// Pause after each `/chat` chunk.
pub const CHUNK_INTERVAL: Duration = Duration::from_millis(50);

/// Number of events sent by `/rapid`.
pub const RAPID_EVENT_COUNT: usize = 100;

/// Number of chunks sent by `/chat`.
pub const CHAT_CHUNK_COUNT: usize = 5;

/// The parts of a request a script may look at.
#[derive(Debug, Clone)]
pub struct ScriptRequest {
    /// Request method.
    pub method: Method,
    /// Request path, without query string.
    pub path: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body, empty when none was sent.
    pub body: Bytes,
}

impl ScriptRequest {
    /// Creates a request with no headers and an empty body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Adds a header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::HeaderName::from_bytes(name.as_bytes()),
            http::HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns a header value if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A complete non-SSE response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainResponse {
    /// Status code.
    pub status: StatusCode,
    /// Value of the `Content-Type` header.
    pub content_type: &'static str,
    /// Response body.
    pub body: Bytes,
}

impl PlainResponse {
    /// A `text/plain` response.
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: Bytes::from(body.into()),
        }
    }

    /// An `application/json` response.
    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: Bytes::from(value.to_string()),
        }
    }

    /// The 404 sent for any (method, path) without an endpoint.
    pub fn unknown_endpoint(method: &Method, path: &str) -> Self {
        let body = if method == Method::GET {
            format!("Unknown endpoint: {path}")
        } else {
            format!("Unknown {method} endpoint: {path}")
        };
        Self::text(StatusCode::NOT_FOUND, body)
    }
}

/// What an endpoint does for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    /// Send event-stream headers, then play `actions`.
    Stream {
        /// Ordered actions.
        actions: Vec<Action>,
        /// Logged when the stream ends.
        summary: String,
    },
    /// Send a single non-SSE response.
    Respond {
        /// The response.
        response: PlainResponse,
        /// Logged once the response is built.
        summary: String,
    },
}

impl Script {
    fn stream(actions: Vec<Action>, summary: impl Into<String>) -> Self {
        Self::Stream {
            actions,
            summary: summary.into(),
        }
    }

    fn respond(response: PlainResponse, summary: impl Into<String>) -> Self {
        Self::Respond {
            response,
            summary: summary.into(),
        }
    }

    /// Events this script emits, in order. Empty for plain responses.
    pub fn events(&self) -> Vec<&SseEvent> {
        match self {
            Self::Stream { actions, .. } => actions
                .iter()
                .filter_map(|a| match a {
                    Action::Emit(event) => Some(event),
                    _ => None,
                })
                .collect(),
            Self::Respond { .. } => Vec::new(),
        }
    }
}

/// Every behaviour the mock server knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `GET /events`: three paced events.
    Events,
    /// `POST /chat`: five `chunk` events.
    Chat,
    /// `GET /rapid`: a hundred events back to back.
    Rapid,
    /// `GET /error-404`: plain 404.
    Error404,
    /// `GET /wrong-type`: JSON with status 200.
    WrongType,
    /// `GET /with-id`: events carrying IDs.
    WithId,
    /// `GET /multiline`: one event with three data lines.
    Multiline,
    /// `GET /retry`: a `retry` field followed by a plain event.
    Retry,
    /// `GET /disconnect`: two events, then close.
    Disconnect,
    /// `GET /reconnect-test`: one event, then close.
    ReconnectTest,
    /// `GET /retry-override`: `retry: 500`, then close.
    RetryOverride,
    /// `GET /events-with-id`: answers according to `Last-Event-ID`.
    EventsWithId,
}

impl Endpoint {
    /// All endpoints, in banner order.
    pub const ALL: [Endpoint; 12] = [
        Self::Events,
        Self::Chat,
        Self::Rapid,
        Self::Error404,
        Self::WrongType,
        Self::WithId,
        Self::Multiline,
        Self::Retry,
        Self::Disconnect,
        Self::ReconnectTest,
        Self::RetryOverride,
        Self::EventsWithId,
    ];

    /// The method this endpoint answers.
    pub fn method(self) -> Method {
        match self {
            Self::Chat => Method::POST,
            _ => Method::GET,
        }
    }

    /// The exact path this endpoint answers.
    pub fn path(self) -> &'static str {
        match self {
            Self::Events => "/events",
            Self::Chat => "/chat",
            Self::Rapid => "/rapid",
            Self::Error404 => "/error-404",
            Self::WrongType => "/wrong-type",
            Self::WithId => "/with-id",
            Self::Multiline => "/multiline",
            Self::Retry => "/retry",
            Self::Disconnect => "/disconnect",
            Self::ReconnectTest => "/reconnect-test",
            Self::RetryOverride => "/retry-override",
            Self::EventsWithId => "/events-with-id",
        }
    }

    /// One-line description for the startup banner.
    pub fn description(self) -> &'static str {
        match self {
            Self::Events => "3 standard events",
            Self::Chat => "5 chunk events (expects JSON body)",
            Self::Rapid => "100 rapid events",
            Self::Error404 => "404 error",
            Self::WrongType => "Wrong Content-Type",
            Self::WithId => "Events with id field",
            Self::Multiline => "Multi-line data event",
            Self::Retry => "Retry field test",
            Self::Disconnect => "2 events then disconnect",
            Self::ReconnectTest => "1 event then close (auto-reconnect test)",
            Self::RetryOverride => "retry:500 event then close",
            Self::EventsWithId => "ID-based resumption (checks Last-Event-ID)",
        }
    }

    /// Whether the script tears the connection down itself.
    pub fn closes_connection(self) -> bool {
        matches!(
            self,
            Self::Disconnect | Self::ReconnectTest | Self::RetryOverride
        )
    }

    /// Builds the script for one request.
    ///
    /// Only [`Endpoint::EventsWithId`] reads `resumption`; only
    /// [`Endpoint::Chat`] reads the body and `Authorization` header.
    pub fn script(self, request: &ScriptRequest, resumption: &ResumptionState) -> Script {
        match self {
            Self::Events => Script::stream(
                paced(
                    ["Event 1", "Event 2", "Event 3"].map(SseEvent::new),
                    EVENT_INTERVAL,
                ),
                "Sent 3 events to /events",
            ),
            Self::Chat => {
                observe_chat_request(request);

                let mut actions = Vec::with_capacity(CHAT_CHUNK_COUNT * 2);
                for n in 1..=CHAT_CHUNK_COUNT {
                    actions.push(Action::emit(
                        SseEvent::new(format!("Chunk {n}")).event("chunk"),
                    ));
                    actions.push(Action::Sleep(CHUNK_INTERVAL));
                }
                Script::stream(actions, "Sent 5 chunk events")
            }
            Self::Rapid => Script::stream(
                (1..=RAPID_EVENT_COUNT)
                    .map(|n| Action::emit(format!("Rapid event {n}")))
                    .collect(),
                "Sent 100 rapid events",
            ),
            Self::Error404 => Script::respond(
                PlainResponse::text(
                    StatusCode::NOT_FOUND,
                    format!("Not Found: {}", request.path),
                ),
                "Sent 404 error",
            ),
            Self::WrongType => Script::respond(
                PlainResponse::json(
                    StatusCode::OK,
                    &serde_json::json!({ "error": "wrong type" }),
                ),
                "Sent wrong Content-Type",
            ),
            Self::WithId => Script::stream(
                paced(
                    [
                        SseEvent::new("First message").id("msg-001"),
                        SseEvent::new("Second message").id("msg-002"),
                        SseEvent::new("Third message").id("msg-003"),
                    ],
                    EVENT_INTERVAL,
                ),
                "Sent events with IDs",
            ),
            Self::Multiline => Script::stream(
                vec![Action::emit("Line 1\nLine 2\nLine 3")],
                "Sent multiline event",
            ),
            Self::Retry => Script::stream(
                paced(
                    [
                        SseEvent::new("Retry set to 5 seconds").retry(Duration::from_millis(5000)),
                        SseEvent::new("Another event"),
                    ],
                    EVENT_INTERVAL,
                ),
                "Sent retry field",
            ),
            Self::Disconnect => {
                let mut actions = paced(
                    [
                        SseEvent::new("Event before disconnect 1"),
                        SseEvent::new("Event before disconnect 2"),
                    ],
                    EVENT_INTERVAL,
                );
                actions.push(Action::Close);
                Script::stream(actions, "Sent 2 events, closing connection")
            }
            Self::ReconnectTest => Script::stream(
                vec![Action::emit("Reconnect test event"), Action::Close],
                "Sent 1 event, closing for reconnect test",
            ),
            Self::RetryOverride => Script::stream(
                vec![
                    Action::emit(SseEvent::new("fast").retry(Duration::from_millis(500))),
                    Action::Close,
                ],
                "Sent retry:500 event, closing",
            ),
            Self::EventsWithId => {
                let event = resumption.check_and_advance(request.header("last-event-id"));
                let summary = match (event.data(), event.id_value()) {
                    (Some(data), Some(id)) => format!("Sent {data} event (id:{id})"),
                    _ => "Sent resumption event".to_string(),
                };
                Script::stream(vec![Action::Emit(event)], summary)
            }
        }
    }
}

/// Interleaves `events` with pauses of `interval`; no pause after the last.
fn paced<const N: usize>(events: [SseEvent; N], interval: Duration) -> Vec<Action> {
    let mut actions = Vec::with_capacity(N * 2);
    for (i, event) in events.into_iter().enumerate() {
        if i > 0 {
            actions.push(Action::Sleep(interval));
        }
        actions.push(Action::Emit(event));
    }
    actions
}

fn observe_chat_request(request: &ScriptRequest) {
    let body = String::from_utf8_lossy(&request.body);
    tracing::info!(
        http.path = %request.path,
        body = %body,
        "POST /chat received body"
    );

    let authorization = request.header("authorization").unwrap_or("None");
    tracing::info!(authorization = %authorization, "Authorization header");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script_for(endpoint: Endpoint) -> Script {
        let request = ScriptRequest::new(endpoint.method(), endpoint.path());
        endpoint.script(&request, &ResumptionState::new())
    }

    fn data_of(script: &Script) -> Vec<String> {
        script
            .events()
            .iter()
            .map(|e| e.data().unwrap_or_default().to_string())
            .collect()
    }

    fn sleeps_of(script: &Script) -> Vec<Duration> {
        match script {
            Script::Stream { actions, .. } => actions
                .iter()
                .filter_map(|a| match a {
                    Action::Sleep(d) => Some(*d),
                    _ => None,
                })
                .collect(),
            Script::Respond { .. } => Vec::new(),
        }
    }

    fn ends_with_close(script: &Script) -> bool {
        matches!(script, Script::Stream { actions, .. } if actions.last() == Some(&Action::Close))
    }

    #[test]
    fn test_paths_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for endpoint in Endpoint::ALL {
            assert!(seen.insert((endpoint.method(), endpoint.path())));
        }
    }

    #[test]
    fn test_only_chat_is_post() {
        for endpoint in Endpoint::ALL {
            let expected = if endpoint == Endpoint::Chat {
                Method::POST
            } else {
                Method::GET
            };
            assert_eq!(endpoint.method(), expected, "{endpoint:?}");
        }
    }

    #[test]
    fn test_events_script() {
        let script = script_for(Endpoint::Events);
        assert_eq!(data_of(&script), ["Event 1", "Event 2", "Event 3"]);
        assert_eq!(sleeps_of(&script), [EVENT_INTERVAL, EVENT_INTERVAL]);
        assert!(script
            .events()
            .iter()
            .all(|e| e.id_value().is_none() && e.event_type().is_none()));
        assert!(!ends_with_close(&script));
    }

    #[test]
    fn test_chat_script() {
        let request = ScriptRequest::new(Method::POST, "/chat")
            .with_header("authorization", "Bearer token")
            .with_body(r#"{"message":"hi"}"#);
        let script = Endpoint::Chat.script(&request, &ResumptionState::new());

        assert_eq!(
            data_of(&script),
            ["Chunk 1", "Chunk 2", "Chunk 3", "Chunk 4", "Chunk 5"]
        );
        assert!(script.events().iter().all(|e| e.event_type() == Some("chunk")));
        assert_eq!(sleeps_of(&script), vec![CHUNK_INTERVAL; CHAT_CHUNK_COUNT]);
    }

    #[test]
    fn test_rapid_script_has_no_pauses() {
        let script = script_for(Endpoint::Rapid);
        let data = data_of(&script);
        assert_eq!(data.len(), RAPID_EVENT_COUNT);
        assert_eq!(data[0], "Rapid event 1");
        assert_eq!(data[99], "Rapid event 100");
        assert!(sleeps_of(&script).is_empty());
    }

    #[test]
    fn test_error_404_names_path() {
        match script_for(Endpoint::Error404) {
            Script::Respond { response, .. } => {
                assert_eq!(response.status, StatusCode::NOT_FOUND);
                assert_eq!(response.content_type, "text/plain");
                let body = String::from_utf8_lossy(&response.body).into_owned();
                assert!(body.contains("Not Found"));
                assert!(body.contains("/error-404"));
            }
            other => panic!("expected plain response, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_type_is_json_with_error_key() {
        match script_for(Endpoint::WrongType) {
            Script::Respond { response, .. } => {
                assert_eq!(response.status, StatusCode::OK);
                assert_eq!(response.content_type, "application/json");
                let value: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
                assert!(value.get("error").is_some());
            }
            other => panic!("expected plain response, got {other:?}"),
        }
    }

    #[test]
    fn test_with_id_script() {
        let script = script_for(Endpoint::WithId);
        let ids: Vec<_> = script.events().iter().map(|e| e.id_value()).collect();
        assert_eq!(ids, [Some("msg-001"), Some("msg-002"), Some("msg-003")]);
        assert_eq!(sleeps_of(&script).len(), 2);
    }

    #[test]
    fn test_multiline_script() {
        let script = script_for(Endpoint::Multiline);
        assert_eq!(data_of(&script), ["Line 1\nLine 2\nLine 3"]);
    }

    #[test]
    fn test_retry_script() {
        let script = script_for(Endpoint::Retry);
        let events = script.events();
        assert_eq!(events[0].retry_interval(), Some(Duration::from_secs(5)));
        assert_eq!(events[1].retry_interval(), None);
        assert_eq!(events[1].data(), Some("Another event"));
    }

    #[test]
    fn test_closing_endpoints_end_with_close() {
        for endpoint in Endpoint::ALL {
            let script = script_for(endpoint);
            assert_eq!(
                ends_with_close(&script),
                endpoint.closes_connection(),
                "{endpoint:?}"
            );
        }
    }

    #[test]
    fn test_closing_endpoint_event_counts() {
        assert_eq!(script_for(Endpoint::Disconnect).events().len(), 2);
        assert_eq!(script_for(Endpoint::ReconnectTest).events().len(), 1);

        let retry_override = script_for(Endpoint::RetryOverride);
        let events = retry_override.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data(), Some("fast"));
        assert_eq!(events[0].retry_interval(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_events_with_id_branches() {
        let state = ResumptionState::new();

        let fresh = ScriptRequest::new(Method::GET, "/events-with-id");
        let script = Endpoint::EventsWithId.script(&fresh, &state);
        assert_eq!(script.events()[0].id_value(), Some("100"));
        assert_eq!(script.events()[0].data(), Some("first"));

        let resuming = fresh.clone().with_header("Last-Event-ID", "100");
        let script = Endpoint::EventsWithId.script(&resuming, &state);
        assert_eq!(script.events()[0].id_value(), Some("101"));
        assert_eq!(script.events()[0].data(), Some("resumed"));
        assert_eq!(state.last_issued().as_deref(), Some("101"));
    }

    #[test]
    fn test_stateless_scripts_are_repeatable() {
        for endpoint in Endpoint::ALL {
            if endpoint == Endpoint::EventsWithId {
                continue;
            }
            assert_eq!(script_for(endpoint), script_for(endpoint), "{endpoint:?}");
        }
    }

    #[test]
    fn test_unknown_endpoint_body() {
        let get = PlainResponse::unknown_endpoint(&Method::GET, "/nope");
        assert_eq!(get.status, StatusCode::NOT_FOUND);
        assert_eq!(get.body, Bytes::from("Unknown endpoint: /nope"));

        let post = PlainResponse::unknown_endpoint(&Method::POST, "/nope");
        assert_eq!(post.body, Bytes::from("Unknown POST endpoint: /nope"));
    }
}
