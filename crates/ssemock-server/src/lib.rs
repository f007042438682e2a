//! # ssemock Server
//!
//! A deterministic Server-Sent Events server for exercising SSE clients.
//!
//! Every endpoint is a fixed script: a handful of events with fixed content
//! and pacing, a deliberately wrong response, or a stream that closes the
//! connection on purpose. `/events-with-id` answers according to the
//! `Last-Event-ID` the client sends, so clients can test resumption.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ssemock_server::{Server, ShutdownSignal};
//! use ssemock_sse::InstantClock;
//!
//! # async fn example() -> Result<(), ssemock_server::ServerError> {
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
//! let shutdown = ShutdownSignal::new();
//!
//! let server = Server::builder().clock(Arc::new(InstantClock)).build()?;
//! tokio::spawn(server.serve(listener, shutdown.clone()));
//!
//! // ... point a client at the listener ...
//! shutdown.trigger();
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/ssemock-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod endpoints;
mod error;
pub mod registry;
pub mod resumption;
mod server;
pub mod session;
pub mod shutdown;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use endpoints::{Endpoint, PlainResponse, Script, ScriptRequest};
pub use error::{RegistryError, ServerError, ServerResult};
pub use registry::EndpointRegistry;
pub use resumption::ResumptionState;
pub use server::{Server, ServerBuilder};
pub use session::{HttpResponse, ResponseBody, Session};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
