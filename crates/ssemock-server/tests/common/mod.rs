//! Shared helpers for the server integration tests.
//!
//! The client speaks raw HTTP/1.1 over TCP so tests see exactly what goes on
//! the wire: status line, headers, chunk boundaries and connection close.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ssemock_server::{ResumptionState, Server, ServerResult, ShutdownSignal};
use ssemock_sse::{Clock, EventDecoder, InstantClock, ReceivedEvent};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Upper bound for any single read in these tests.
pub const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: ShutdownSignal,
    pub resumption: Arc<ResumptionState>,
    handle: JoinHandle<ServerResult<()>>,
}

impl TestServer {
    /// Starts a server whose pauses complete immediately.
    pub async fn start() -> Self {
        Self::start_with_clock(Arc::new(InstantClock)).await
    }

    /// Starts a server with the given pacing clock.
    pub async fn start_with_clock(clock: Arc<dyn Clock>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = ShutdownSignal::new();
        let resumption = Arc::new(ResumptionState::new());

        let server = Server::builder()
            .http_addr(addr.to_string())
            .shutdown_timeout(Duration::from_millis(200))
            .clock(clock)
            .resumption(Arc::clone(&resumption))
            .build()
            .unwrap();

        let handle = tokio::spawn(server.serve(listener, shutdown.clone()));

        Self {
            addr,
            shutdown,
            resumption,
            handle,
        }
    }

    /// Opens a new connection.
    pub async fn connect(&self) -> Client {
        let stream = TcpStream::connect(self.addr).await.unwrap();
        Client {
            reader: BufReader::new(stream),
        }
    }

    /// Sends a single `GET` on a fresh connection that the server closes
    /// after the response.
    pub async fn get(&self, path: &str) -> RawResponse {
        self.request("GET", path, &[], b"").await
    }

    /// Sends a single request with `Connection: close`.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> RawResponse {
        let mut all = vec![("Connection", "close")];
        all.extend_from_slice(headers);

        let mut client = self.connect().await;
        client.send(method, path, &all, body).await;
        client.read_response().await
    }

    /// Triggers shutdown and waits for the accept loop to finish.
    pub async fn stop(self) -> ServerResult<()> {
        self.shutdown.trigger();
        tokio::time::timeout(IO_TIMEOUT, self.handle)
            .await
            .expect("server did not stop")
            .expect("server task panicked")
    }
}

/// One raw HTTP/1.1 connection.
pub struct Client {
    reader: BufReader<TcpStream>,
}

impl Client {
    /// Writes a request. `Host` and, for non-empty bodies, `Content-Length`
    /// are added automatically.
    pub async fn send(&mut self, method: &str, path: &str, headers: &[(&str, &str)], body: &[u8]) {
        let mut request = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\n");
        for (name, value) in headers {
            request.push_str(&format!("{name}: {value}\r\n"));
        }
        if !body.is_empty() {
            request.push_str(&format!("Content-Length: {}\r\n", body.len()));
        }
        request.push_str("\r\n");

        let stream = self.reader.get_mut();
        stream.write_all(request.as_bytes()).await.unwrap();
        stream.write_all(body).await.unwrap();
        stream.flush().await.unwrap();
    }

    /// Reads exactly one response, decoding a chunked body chunk by chunk.
    pub async fn read_response(&mut self) -> RawResponse {
        tokio::time::timeout(IO_TIMEOUT, self.read_response_inner())
            .await
            .expect("timed out reading response")
    }

    async fn read_response_inner(&mut self) -> RawResponse {
        let status_line = self.read_line().await;
        let status = status_line
            .split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| panic!("bad status line {status_line:?}"));

        let mut headers = Vec::new();
        loop {
            let line = self.read_line().await;
            if line.is_empty() {
                break;
            }
            let (name, value) = line.split_once(':').expect("malformed header");
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
        }

        let mut response = RawResponse {
            status,
            headers,
            chunks: Vec::new(),
        };

        if response
            .header("transfer-encoding")
            .is_some_and(|v| v.eq_ignore_ascii_case("chunked"))
        {
            loop {
                let size_line = self.read_line().await;
                let size = usize::from_str_radix(size_line.split(';').next().unwrap().trim(), 16)
                    .expect("bad chunk size");
                if size == 0 {
                    // Trailer section ends with an empty line.
                    while !self.read_line().await.is_empty() {}
                    break;
                }
                let mut chunk = vec![0; size];
                self.reader.read_exact(&mut chunk).await.unwrap();
                assert_eq!(self.read_line().await, "");
                response.chunks.push(chunk);
            }
        } else if let Some(len) = response.header("content-length") {
            let mut body = vec![0; len.parse().unwrap()];
            self.reader.read_exact(&mut body).await.unwrap();
            response.chunks.push(body);
        } else {
            let mut body = Vec::new();
            self.reader.read_to_end(&mut body).await.unwrap();
            response.chunks.push(body);
        }

        response
    }

    /// Reads whatever bytes arrive next, without parsing them.
    pub async fn read_some(&mut self) -> Vec<u8> {
        let mut buf = vec![0u8; 4096];
        let n = tokio::time::timeout(IO_TIMEOUT, self.reader.read(&mut buf))
            .await
            .expect("timed out reading")
            .unwrap();
        buf.truncate(n);
        buf
    }

    /// Whether the server has closed the connection.
    pub async fn closed_by_server(&mut self) -> bool {
        let mut buf = [0u8; 1];
        matches!(
            tokio::time::timeout(IO_TIMEOUT, self.reader.read(&mut buf)).await,
            Ok(Ok(0) | Err(_))
        )
    }

    async fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        line.trim_end_matches(['\r', '\n']).to_string()
    }
}

/// A response as read off the wire.
#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub chunks: Vec<Vec<u8>>,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> Vec<u8> {
        self.chunks.concat()
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body()).unwrap()
    }

    pub fn events(&self) -> Vec<ReceivedEvent> {
        EventDecoder::decode_all(&self.body())
    }

    pub fn data(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.data).collect()
    }

    pub fn assert_event_stream(&self) {
        assert_eq!(self.status, 200);
        assert_eq!(self.header("content-type"), Some("text/event-stream"));
        assert_eq!(self.header("cache-control"), Some("no-cache"));
    }
}
