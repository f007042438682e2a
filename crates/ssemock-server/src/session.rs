//! One request's worth of response: headers, then either a scripted event
//! stream or a single plain body.

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::TryStreamExt;
use http::{header, Response};
use http_body_util::{combinators::UnsyncBoxBody, BodyExt, Full, StreamBody};
use hyper::body::Frame;
use ssemock_sse::{sse_headers, Action, Clock, ScriptStream};

use crate::endpoints::{PlainResponse, Script};
use crate::shutdown::ShutdownSignal;

/// Body type of every response the server sends.
pub type ResponseBody = UnsyncBoxBody<Bytes, Infallible>;

/// Response type of every request the server handles.
pub type HttpResponse = Response<ResponseBody>;

/// Turns a [`Script`] into a response for one connection.
///
/// `close` is the connection's own signal: when a stream script reaches
/// [`Action::Close`] the session triggers it and the connection task stops
/// serving once the body has been flushed.
#[derive(Debug)]
pub struct Session {
    label: String,
    clock: Arc<dyn Clock>,
    close: ShutdownSignal,
}

impl Session {
    /// Creates a session for the request at `label` (its path).
    pub fn new(label: impl Into<String>, clock: Arc<dyn Clock>, close: ShutdownSignal) -> Self {
        Self {
            label: label.into(),
            clock,
            close,
        }
    }

    /// Builds the response for `script`.
    pub fn respond(self, script: Script) -> HttpResponse {
        match script {
            Script::Stream { actions, summary } => self.stream(actions, summary),
            Script::Respond { response, summary } => {
                tracing::info!(
                    http.path = %self.label,
                    http.status_code = response.status.as_u16(),
                    "{}",
                    summary
                );
                plain_response(response)
            }
        }
    }

    fn stream(self, actions: Vec<Action>, summary: String) -> HttpResponse {
        let close = self.close;
        let frames = ScriptStream::new(actions, self.clock)
            .with_label(self.label)
            .with_summary(summary)
            .on_close(move || close.trigger());

        let body = StreamBody::new(frames.map_ok(Frame::data)).boxed_unsync();
        let mut response = Response::new(body);
        *response.headers_mut() = sse_headers();
        response
    }
}

/// Builds a complete non-SSE response.
pub fn plain_response(response: PlainResponse) -> HttpResponse {
    let PlainResponse {
        status,
        content_type,
        body,
    } = response;

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .body(full(body))
        .unwrap_or_else(|_| Response::new(full(Bytes::new())))
}

fn full(bytes: Bytes) -> ResponseBody {
    Full::new(bytes).boxed_unsync()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use ssemock_sse::{EventDecoder, InstantClock, SseEvent};

    fn session(close: &ShutdownSignal) -> Session {
        Session::new("/test", Arc::new(InstantClock), close.clone())
    }

    #[tokio::test]
    async fn test_stream_response_headers_and_body() {
        let close = ShutdownSignal::new();
        let script = Script::Stream {
            actions: vec![Action::emit("a"), Action::sleep_ms(100), Action::emit("b")],
            summary: "done".to_string(),
        };

        let response = session(&close).respond(script);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/event-stream");
        assert_eq!(response.headers()["cache-control"], "no-cache");
        assert_eq!(response.headers()["connection"], "keep-alive");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"data: a\n\ndata: b\n\n");
        assert!(!close.is_shutdown());
    }

    #[tokio::test]
    async fn test_each_event_is_its_own_frame() {
        let close = ShutdownSignal::new();
        let script = Script::Stream {
            actions: vec![
                Action::emit(SseEvent::new("1").id("1")),
                Action::emit(SseEvent::new("2").id("2")),
            ],
            summary: String::new(),
        };

        let mut body = session(&close).respond(script).into_body();
        let mut frames = Vec::new();
        while let Some(frame) = body.frame().await {
            if let Ok(data) = frame.unwrap().into_data() {
                frames.push(data);
            }
        }

        assert_eq!(frames.len(), 2);
        assert_eq!(EventDecoder::decode_all(&frames[0])[0].id, "1");
        assert_eq!(EventDecoder::decode_all(&frames[1])[0].id, "2");
    }

    #[tokio::test]
    async fn test_close_action_triggers_signal() {
        let close = ShutdownSignal::new();
        let script = Script::Stream {
            actions: vec![Action::emit("bye"), Action::Close],
            summary: "closing".to_string(),
        };

        let body = session(&close)
            .respond(script)
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes();

        assert_eq!(&body[..], b"data: bye\n\n");
        assert!(close.is_shutdown());
    }

    #[tokio::test]
    async fn test_plain_response() {
        let close = ShutdownSignal::new();
        let script = Script::Respond {
            response: PlainResponse::text(StatusCode::NOT_FOUND, "Not Found: /x"),
            summary: "404".to_string(),
        };

        let response = session(&close).respond(script);

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["content-type"], "text/plain");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Not Found: /x");
    }
}
