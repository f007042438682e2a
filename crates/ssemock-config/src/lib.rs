//! Typed configuration for the ssemock server.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict parsing (unknown fields are errors)
//! - Layered loading (defaults → file → env)
//!
//! # Example
//!
//! ```no_run
//! use ssemock_config::ConfigLoader;
//!
//! # fn main() -> Result<(), ssemock_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("ssemock.toml")?
//!     .with_env_prefix("SSEMOCK")
//!     .load()?;
//!
//! println!("listening on {}", config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # File format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:9999"
//! shutdown_timeout_secs = 5
//! request_timeout_ms = 30000
//! keep_alive = true
//!
//! [pacing]
//! mode = "realtime"   # or "instant"
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "pretty"   # or "json"
//! include_location = false
//! ```
//!
//! # Environment overrides
//!
//! `PREFIX__SECTION__KEY`, for example `SSEMOCK__SERVER__HTTP_ADDR=127.0.0.1:8000`
//! or `SSEMOCK__PACING__MODE=instant`. Unknown keys are ignored.

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{MockConfig, MockConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LogFormat, LoggingConfig, PacingConfig, PacingMode, ServerSection};

/// Environment prefix the `ssemock` binary uses.
pub const ENV_PREFIX: &str = "SSEMOCK";
