//! Structured logging setup.
//!
//! Installs a `tracing-subscriber` registry with a single `fmt` layer, JSON or
//! pretty, filtered by an [`EnvFilter`]. `RUST_LOG` wins over the configured
//! level when it is set.
//!
//! # Example
//!
//! ```rust,no_run
//! use ssemock_telemetry::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::default()).unwrap();
//! tracing::info!(http.path = "/events", events = 3, "Sent 3 events to /events");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether to install a subscriber.
    pub enabled: bool,

    /// Filter directive used when `RUST_LOG` is unset, e.g. `"info"` or
    /// `"ssemock_server=debug,info"`.
    pub level: String,

    /// JSON lines instead of pretty output.
    pub json_format: bool,

    /// Include file and line number.
    pub file_line_info: bool,

    /// Include the module path of each record.
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: false,
            file_line_info: false,
            include_target: false,
        }
    }
}

impl LogConfig {
    /// JSON output for log collectors.
    #[must_use]
    pub fn json() -> Self {
        Self {
            json_format: true,
            include_target: true,
            ..Self::default()
        }
    }
}

/// Installs the global subscriber.
///
/// Does nothing when `config.enabled` is false.
///
/// # Errors
///
/// Returns [`TelemetryError::LoggingInit`] if the filter is invalid or a
/// global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    Ok(())
}

/// Builds the filter: `RUST_LOG` if set and valid, otherwise `default`.
///
/// # Errors
///
/// Returns an error if `default` is not a valid directive.
pub fn create_env_filter(default: &str) -> TelemetryResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(default)
        .map_err(|e| TelemetryError::LoggingInit(format!("invalid log level '{default}': {e}")))
}
