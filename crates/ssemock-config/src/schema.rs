//! Configuration schema types.
//!
//! Each struct is one `[section]` of the configuration file.

use serde::{Deserialize, Serialize};

/// `[server]`: listener and connection settings.
///
/// # Example
///
/// ```
/// use ssemock_config::ServerSection;
///
/// let section = ServerSection::default();
/// assert_eq!(section.http_addr, "0.0.0.0:9999");
/// assert!(section.keep_alive);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Bind address.
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Seconds to wait for open connections on shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Milliseconds allowed for reading a request body.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// HTTP/1.1 keep-alive for streams that end naturally.
    #[serde(default = "default_true")]
    pub keep_alive: bool,
}

impl ServerSection {
    /// Replaces the port of `http_addr`, keeping the host.
    pub fn set_port(&mut self, port: u16) {
        let host = self
            .http_addr
            .rsplit_once(':')
            .map_or("0.0.0.0", |(host, _)| host);
        self.http_addr = format!("{host}:{port}");
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            request_timeout_ms: default_request_timeout(),
            keep_alive: true,
        }
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:9999".to_string()
}

fn default_shutdown_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

/// How scripted pauses are honoured.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PacingMode {
    /// Sleep for the scripted duration.
    #[default]
    Realtime,
    /// Skip every pause.
    Instant,
}

impl std::str::FromStr for PacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "realtime" => Ok(Self::Realtime),
            "instant" => Ok(Self::Instant),
            other => Err(format!("expected 'realtime' or 'instant', got '{other}'")),
        }
    }
}

/// `[pacing]`: event timing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct PacingConfig {
    /// Pacing mode.
    #[serde(default)]
    pub mode: PacingMode,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'json' or 'pretty', got '{other}'")),
        }
    }
}

/// `[logging]`: diagnostic output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Whether to install a subscriber at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Default filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include file and line in each record.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
