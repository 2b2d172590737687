//! Logging bootstrap for applications embedding the client.
//!
//! Console output is always filtered by `RUST_LOG` when set, falling back to
//! the configured level. File output goes to a daily-rolling `hostdeck.log`
//! under the log directory.
//!
//! Environment:
//! - `HOSTDECK_LOG_LEVEL` - default level (`info`)
//! - `HOSTDECK_LOG_FILE` - enable file output (`false`)
//! - `HOSTDECK_LOG_DIR` - log directory (`~/hostdeck/logs`)

use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

const LOG_FILE_NAME: &str = "hostdeck.log";

fn default_log_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(format!("{}/hostdeck/logs", home))
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,
    pub level: Level,
    pub file_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            level: Level::INFO,
            file_logging: false,
        }
    }
}

impl LoggingConfig {
    /// Create from environment variables.
    pub fn from_env() -> Self {
        let log_dir = std::env::var("HOSTDECK_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_log_dir());

        let level = std::env::var("HOSTDECK_LOG_LEVEL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Level::INFO);

        let file_logging = std::env::var("HOSTDECK_LOG_FILE")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false);

        Self {
            log_dir,
            level,
            file_logging,
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.to_string()))
    }
}

/// Keeps the non-blocking file writer alive; buffered output is flushed on drop.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// Returns a guard that must be held for the lifetime of the application. If a
/// global subscriber is already installed the existing one is kept.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, Box<dyn std::error::Error>> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    let mut file_guard = None;

    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_filter(config.filter());
    layers.push(Box::new(console_layer));

    if config.file_logging {
        std::fs::create_dir_all(&config.log_dir)?;
        let appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, LOG_FILE_NAME);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        file_guard = Some(guard);

        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_filter(config.filter());
        layers.push(Box::new(file_layer));
    }

    if let Err(e) = tracing_subscriber::registry().with(layers).try_init() {
        eprintln!("Logging already initialized: {}", e);
    }

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
