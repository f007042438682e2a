//! Error types for the mock server.

use std::net::SocketAddr;

use http::Method;
use thiserror::Error;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address is not a socket address.
    #[error("invalid address '{addr}': {source}")]
    InvalidAddress {
        /// The address as configured.
        addr: String,
        /// Parse failure.
        #[source]
        source: std::net::AddrParseError,
    },

    /// The listener could not be bound.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        /// The address we tried.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error on the listening socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The endpoint table is inconsistent.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ServerError {
    /// Creates a bind error.
    pub fn bind(addr: SocketAddr, source: std::io::Error) -> Self {
        Self::Bind { addr, source }
    }

    /// Whether this is a bind or address failure.
    pub fn is_bind_error(&self) -> bool {
        matches!(self, Self::Bind { .. } | Self::InvalidAddress { .. })
    }
}

/// Errors raised while building the endpoint table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two endpoints claim the same method and path.
    #[error("duplicate route: {method} {path}")]
    DuplicateRoute {
        /// Request method.
        method: Method,
        /// Request path.
        path: String,
    },
}

impl RegistryError {
    /// Creates a duplicate-route error.
    pub fn duplicate(method: Method, path: impl Into<String>) -> Self {
        Self::DuplicateRoute {
            method,
            path: path.into(),
        }
    }
}

/// Result alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
