//! Diagnostics for the ssemock server.
//!
//! All crates log through `tracing` macros with structured fields; this crate
//! owns the one place where a subscriber is installed.
//!
//! # Example
//!
//! ```rust,no_run
//! use ssemock_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::json()).expect("logging already initialised");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
