//! Top-level [`MockConfig`].

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LoggingConfig, PacingConfig, PacingMode, ServerSection};

/// Complete mock server configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and the
/// environment.
///
/// # Example
///
/// ```
/// use ssemock_config::{MockConfig, PacingMode};
///
/// let config = MockConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:9999");
/// assert_eq!(config.pacing.mode, PacingMode::Realtime);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct MockConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Event pacing.
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Diagnostic logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MockConfig {
    /// Creates a builder starting from defaults.
    #[must_use]
    pub fn builder() -> MockConfigBuilder {
        MockConfigBuilder::default()
    }

    /// Checks values serde cannot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `server.http_addr` is not a
    /// socket address or `logging.level` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .server
            .http_addr
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "logging.level",
                "must not be empty",
            ));
        }

        Ok(())
    }
}

/// Builder for [`MockConfig`].
#[derive(Debug, Clone, Default)]
pub struct MockConfigBuilder {
    config: MockConfig,
}

impl MockConfigBuilder {
    /// Sets the `[server]` section.
    #[must_use]
    pub fn server(mut self, server: ServerSection) -> Self {
        self.config.server = server;
        self
    }

    /// Sets the pacing mode.
    #[must_use]
    pub fn pacing(mut self, mode: PacingMode) -> Self {
        self.config.pacing.mode = mode;
        self
    }

    /// Sets the `[logging]` section.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn build(self) -> MockConfig {
        self.config
    }
}
