//! HTTP server: accept loop, per-connection tasks, request dispatch.
//!
//! Each accepted connection gets its own task and its own close signal.
//! Requests are dispatched through the [`EndpointRegistry`] and answered by a
//! [`Session`]; a script that closes early triggers the connection's signal
//! and the task ends the socket after the body is flushed.
//!
//! # Example
//!
//! ```rust,no_run
//! use ssemock_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::builder().http_addr("127.0.0.1:9999").build()?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Method, Request};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use ssemock_sse::{Clock, TokioClock};
use tokio::net::{TcpListener, TcpStream};

use crate::config::{ServerConfig, ServerConfigBuilder};
use crate::endpoints::{PlainResponse, ScriptRequest};
use crate::error::{ServerError, ServerResult};
use crate::registry::EndpointRegistry;
use crate::resumption::ResumptionState;
use crate::session::{plain_response, HttpResponse, Session};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// The mock SSE server.
pub struct Server {
    config: ServerConfig,
    registry: EndpointRegistry,
    resumption: Arc<ResumptionState>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("routes", &self.registry.len())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Creates a server with the standard endpoints and a real-time clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint table is inconsistent.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        Ok(Self {
            config,
            registry: EndpointRegistry::standard()?,
            resumption: Arc::new(ResumptionState::new()),
            clock: Arc::new(TokioClock),
        })
    }

    /// Creates a builder.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// The server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The dispatch table.
    #[must_use]
    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// Shared resumption state for `/events-with-id`.
    #[must_use]
    pub fn resumption(&self) -> &Arc<ResumptionState> {
        &self.resumption
    }

    /// Binds the configured address and serves until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run(self) -> ServerResult<()> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Binds the configured address and serves until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> ServerResult<()> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|source| ServerError::InvalidAddress {
                addr: self.config.http_addr().to_string(),
                source,
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::bind(addr, e))?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener until `shutdown`
    /// fires, then waits up to the shutdown timeout for open connections.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's local address cannot be read.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> ServerResult<()> {
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, routes = self.registry.len(), "Mock SSE server listening");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let server = Arc::clone(&server);
                            let token = tracker.acquire();
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                if let Err(e) = server.handle_connection(stream, remote_addr, shutdown).await {
                                    tracing::debug!(%remote_addr, error = %e, "Connection ended with error");
                                }
                                drop(token);
                            });
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to accept connection");
                        }
                    }
                }

                () = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        let shutdown_timeout = server.config.shutdown_timeout();
        tracing::info!(
            active = tracker.active_connections(),
            timeout = ?shutdown_timeout,
            "Waiting for connections to close"
        );

        tokio::select! {
            () = tracker.wait_for_idle() => {
                tracing::info!("All connections closed");
            }
            () = tokio::time::sleep(shutdown_timeout) => {
                tracing::warn!(
                    active = tracker.active_connections(),
                    "Shutdown timeout reached with connections still open"
                );
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        tracing::debug!(%remote_addr, "Connection accepted");

        let io = TokioIo::new(stream);
        let close = ShutdownSignal::new();

        let server = Arc::clone(&self);
        let close_on_script = close.clone();
        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            let close = close_on_script.clone();
            async move { server.handle_request(req, remote_addr, close).await }
        });

        let conn = http1::Builder::new()
            .keep_alive(self.config.keep_alive())
            .serve_connection(io, service);
        tokio::pin!(conn);

        let mut closing = false;
        loop {
            tokio::select! {
                result = conn.as_mut() => {
                    tracing::debug!(%remote_addr, "Connection closed");
                    return result;
                }
                () = close.recv(), if !closing => {
                    tracing::debug!(%remote_addr, "Script closed the connection");
                    closing = true;
                    conn.as_mut().graceful_shutdown();
                }
                () = shutdown.recv(), if !closing => {
                    tracing::debug!(%remote_addr, "Finishing in-flight request for shutdown");
                    closing = true;
                    conn.as_mut().graceful_shutdown();
                }
            }
        }
    }

    async fn handle_request(
        self: Arc<Self>,
        req: Request<Incoming>,
        remote_addr: SocketAddr,
        close: ShutdownSignal,
    ) -> Result<HttpResponse, Infallible> {
        let (parts, body) = req.into_parts();
        let method = parts.method;
        let path = parts.uri.path().to_string();

        tracing::debug!(http.method = %method, http.path = %path, %remote_addr, "Request");

        let body = self.collect_body(body, &path).await;
        Ok(self.route_request(&method, &path, parts.headers, body, close))
    }

    /// Reads the whole request body. Failures and timeouts yield an empty
    /// body; the client never sees them.
    async fn collect_body(&self, body: Incoming, path: &str) -> Bytes {
        match tokio::time::timeout(self.config.request_timeout(), body.collect()).await {
            Ok(Ok(collected)) => collected.to_bytes(),
            Ok(Err(e)) => {
                tracing::warn!(http.path = %path, error = %e, "Failed to read request body");
                Bytes::new()
            }
            Err(_) => {
                tracing::warn!(http.path = %path, "Request body read timed out");
                Bytes::new()
            }
        }
    }

    /// Dispatches one request to its endpoint and builds the response.
    ///
    /// `close` is triggered if the endpoint's script ends the connection.
    pub fn route_request(
        &self,
        method: &Method,
        path: &str,
        headers: HeaderMap,
        body: Bytes,
        close: ShutdownSignal,
    ) -> HttpResponse {
        let Some(endpoint) = self.registry.resolve(method, path) else {
            tracing::warn!(http.method = %method, http.path = %path, "Unknown endpoint");
            return plain_response(PlainResponse::unknown_endpoint(method, path));
        };

        let request = ScriptRequest {
            method: method.clone(),
            path: path.to_string(),
            headers,
            body,
        };
        let script = endpoint.script(&request, &self.resumption);
        Session::new(path, Arc::clone(&self.clock), close).respond(script)
    }
}

/// Builder for [`Server`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use ssemock_server::{ResumptionState, Server};
/// use ssemock_sse::InstantClock;
///
/// let state = Arc::new(ResumptionState::seeded("100"));
/// let server = Server::builder()
///     .http_addr("127.0.0.1:0")
///     .clock(Arc::new(InstantClock))
///     .resumption(Arc::clone(&state))
///     .build()
///     .unwrap();
///
/// assert_eq!(server.resumption().last_issued().as_deref(), Some("100"));
/// ```
#[derive(Default)]
pub struct ServerBuilder {
    config_builder: ServerConfigBuilder,
    registry: Option<EndpointRegistry>,
    resumption: Option<Arc<ResumptionState>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ServerBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole runtime configuration.
    #[must_use]
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config_builder = ServerConfigBuilder::new()
            .http_addr(config.http_addr())
            .shutdown_timeout(config.shutdown_timeout())
            .request_timeout(config.request_timeout())
            .keep_alive(config.keep_alive());
        self
    }

    /// Sets the bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.http_addr(addr);
        self
    }

    /// Sets the shutdown grace period.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.shutdown_timeout(timeout);
        self
    }

    /// Sets the request body read limit.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.request_timeout(timeout);
        self
    }

    /// Enables or disables keep-alive.
    #[must_use]
    pub fn keep_alive(mut self, enabled: bool) -> Self {
        self.config_builder = self.config_builder.keep_alive(enabled);
        self
    }

    /// Uses a custom dispatch table instead of the standard one.
    #[must_use]
    pub fn registry(mut self, registry: EndpointRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Shares resumption state with the caller.
    #[must_use]
    pub fn resumption(mut self, state: Arc<ResumptionState>) -> Self {
        self.resumption = Some(state);
        self
    }

    /// Sets the pacing clock. Defaults to [`TokioClock`].
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the standard endpoint table is inconsistent.
    pub fn build(self) -> ServerResult<Server> {
        let registry = match self.registry {
            Some(registry) => registry,
            None => EndpointRegistry::standard()?,
        };

        Ok(Server {
            config: self.config_builder.build(),
            registry,
            resumption: self.resumption.unwrap_or_default(),
            clock: self.clock.unwrap_or_else(|| Arc::new(TokioClock)),
        })
    }
}
