//! ssemock - entry point
//!
//! Runs the scripted SSE mock server until SIGINT or SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info};

use ssemock_config::{ConfigLoader, LogFormat, LoggingConfig, MockConfig, PacingMode, ENV_PREFIX};
use ssemock_server::{Server, ServerResult};
use ssemock_sse::{Clock, InstantClock, TokioClock};
use ssemock_telemetry::{init_logging, LogConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration file picked up from the working directory when `--config`
/// is not given.
const DEFAULT_CONFIG_FILE: &str = "ssemock.toml";

/// Command-line arguments.
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    config: Option<PathBuf>,
    port: Option<u16>,
    instant: bool,
}

/// What the command line asks for.
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Run(Args),
    Help,
    Version,
}

impl Args {
    fn parse_from<I>(args: I) -> Result<Command, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut parsed = Self::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args.next().ok_or("--config requires a path")?;
                    parsed.config = Some(PathBuf::from(path));
                }
                "--port" | "-p" => {
                    let value = args.next().ok_or("--port requires a value")?;
                    let port = value
                        .parse()
                        .map_err(|_| format!("invalid port: {value}"))?;
                    parsed.port = Some(port);
                }
                "--instant" => parsed.instant = true,
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                other => return Err(format!("Unknown argument: {other}")),
            }
        }

        Ok(Command::Run(parsed))
    }

    /// Applies command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut MockConfig) {
        if let Some(port) = self.port {
            config.server.set_port(port);
        }
        if self.instant {
            config.pacing.mode = PacingMode::Instant;
        }
    }
}

fn print_help() {
    println!(
        r#"ssemock - scripted Server-Sent Events mock server

USAGE:
    ssemock [OPTIONS]

OPTIONS:
    -c, --config <PATH>    Configuration file (TOML or JSON)
    -p, --port <PORT>      Listen port (default: 9999)
        --instant          Skip all pauses between events
    -h, --help             Print help information
    -V, --version          Print version information

ENVIRONMENT VARIABLES:
    SSEMOCK__SERVER__HTTP_ADDR      Bind address (default: 0.0.0.0:9999)
    SSEMOCK__PACING__MODE           "realtime" or "instant"
    SSEMOCK__LOGGING__LEVEL         Log filter (RUST_LOG takes precedence)
    SSEMOCK__LOGGING__FORMAT        "pretty" or "json"

EXAMPLES:
    ssemock --port 8080
    SSEMOCK__LOGGING__FORMAT=json ssemock --config ssemock.toml
"#
    );
}

fn load_config(args: &Args) -> anyhow::Result<MockConfig> {
    let loader = ConfigLoader::new().with_defaults().with_dotenv()?;

    let loader = match &args.config {
        Some(path) => loader
            .with_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => loader.with_optional_file(DEFAULT_CONFIG_FILE)?,
    };

    let mut config = loader
        .with_env_prefix(ENV_PREFIX)
        .load()
        .context("invalid configuration")?;
    args.apply(&mut config);
    Ok(config)
}

fn log_config(logging: &LoggingConfig) -> LogConfig {
    let preset = match logging.format {
        LogFormat::Json => LogConfig::json(),
        LogFormat::Pretty => LogConfig::default(),
    };

    LogConfig {
        enabled: logging.enabled,
        level: logging.level.clone(),
        file_line_info: logging.include_location,
        ..preset
    }
}

fn build_server(config: &MockConfig) -> ServerResult<Server> {
    let clock: Arc<dyn Clock> = match config.pacing.mode {
        PacingMode::Realtime => Arc::new(TokioClock),
        PacingMode::Instant => Arc::new(InstantClock),
    };

    Server::builder()
        .http_addr(config.server.http_addr.clone())
        .shutdown_timeout(Duration::from_secs(config.server.shutdown_timeout_secs))
        .request_timeout(Duration::from_millis(config.server.request_timeout_ms))
        .keep_alive(config.server.keep_alive)
        .clock(clock)
        .build()
}

fn log_banner(config: &MockConfig, server: &Server) {
    info!(
        version = VERSION,
        http_addr = %config.server.http_addr,
        pacing = ?config.pacing.mode,
        "Mock SSE server starting"
    );
    info!("Endpoints:");
    for endpoint in server.registry().endpoints() {
        info!(
            "  {} {} - {}",
            endpoint.method(),
            endpoint.path(),
            endpoint.description()
        );
    }
}

async fn run(config: MockConfig) -> anyhow::Result<()> {
    let server = build_server(&config).context("failed to create server")?;
    log_banner(&config, &server);

    server.run().await.context("server error")?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = match Args::parse_from(std::env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            print_help();
            return;
        }
        Ok(Command::Version) => {
            println!("ssemock {VERSION}");
            return;
        }
        Err(message) => {
            eprintln!("{message}");
            eprintln!("Use --help for usage information");
            std::process::exit(2);
        }
    };

    // Nothing is listening for tracing events until logging is up.
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ssemock: {e:#}");
            std::process::exit(1);
        }
    };
    if let Err(e) = init_logging(&log_config(&config.logging)) {
        eprintln!("ssemock: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(config).await {
        error!(error = %format!("{e:#}"), "ssemock failed");
        std::process::exit(1);
    }
}
