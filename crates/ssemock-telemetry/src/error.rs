//! Telemetry error types.

use thiserror::Error;

/// Errors raised while setting up diagnostics.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}
