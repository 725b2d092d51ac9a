//! Tracing and logging setup
//!
//! Configures the `tracing` subscriber with environment-based filtering.
//! `RUST_LOG` takes precedence, then `LOG_LEVEL`, then the configured level.
//!
//! Besides the console, events go to two daily-rotated files in the log
//! directory: `app.<date>.log` with everything that passes the filter and
//! `error.<date>.log` with errors only.

use std::path::{Path, PathBuf};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::Environment;

/// Log directory used when `LOG_DIR` is not set
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Rotated files kept per log
const LOG_FILES_KEPT: usize = 7;

const APP_LOG_PREFIX: &str = "app";
const ERROR_LOG_PREFIX: &str = "error";

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level filter (e.g., "info", "debug", "trace")
    pub level: Level,
    /// Enable JSON output format
    pub json: bool,
    /// Include span events (new, close)
    pub span_events: bool,
    /// Include file and line numbers
    pub file_line: bool,
    /// Include the event target (module path)
    pub target: bool,
    /// Directory for the rotated log files; `None` logs to the console only
    pub log_dir: Option<PathBuf>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json: false,
            span_events: false,
            file_line: false,
            target: true,
            log_dir: Some(PathBuf::from(DEFAULT_LOG_DIR)),
        }
    }
}

impl TracingConfig {
    /// Create a development configuration with debug logging
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: Level::DEBUG,
            file_line: true,
            ..Self::default()
        }
    }

    /// Create a production configuration with JSON logging
    #[must_use]
    pub fn production() -> Self {
        Self {
            json: true,
            ..Self::default()
        }
    }

    /// Pick the configuration matching a deployment environment
    #[must_use]
    pub fn for_environment(env: Environment) -> Self {
        match env {
            Environment::Production => Self::production(),
            Environment::Staging => Self::default(),
            Environment::Development => Self::development(),
        }
    }

    /// Set the log directory
    pub fn with_log_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.log_dir = dir;
        self
    }

    /// Apply `LOG_DIR`; an empty value turns the log files off
    pub fn with_log_dir_from_env(self) -> Self {
        self.with_log_dir_var(std::env::var("LOG_DIR").ok())
    }

    fn with_log_dir_var(self, value: Option<String>) -> Self {
        match value {
            Some(dir) if dir.trim().is_empty() => self.with_log_dir(None),
            Some(dir) => self.with_log_dir(Some(PathBuf::from(dir))),
            None => self,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_from_env("LOG_LEVEL"))
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_string()))
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }
}

/// Flushes the log files when dropped; hold it until the process exits
#[must_use = "dropping the guard stops writing the log files"]
pub struct TracingGuard {
    _workers: Vec<WorkerGuard>,
}

/// Install the global subscriber
///
/// Exactly one of the JSON and pretty console layers is active. Fails if a
/// subscriber is already set or the log files cannot be opened.
pub fn try_init_tracing_with_config(config: TracingConfig) -> Result<TracingGuard, TracingError> {
    let json_layer = config.json.then(|| {
        fmt::layer()
            .json()
            .with_file(config.file_line)
            .with_line_number(config.file_line)
            .with_target(config.target)
            .with_span_events(config.span_events())
    });

    let pretty_layer = (!config.json).then(|| {
        fmt::layer()
            .with_file(config.file_line)
            .with_line_number(config.file_line)
            .with_target(config.target)
            .with_span_events(config.span_events())
    });

    let mut workers = Vec::new();
    let (app_file_layer, error_file_layer) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| TracingError::LogDir {
                path: dir.clone(),
                source,
            })?;

            let (app_writer, app_guard) =
                tracing_appender::non_blocking(rolling_file(dir, APP_LOG_PREFIX)?);
            let (error_writer, error_guard) =
                tracing_appender::non_blocking(rolling_file(dir, ERROR_LOG_PREFIX)?);
            workers.push(app_guard);
            workers.push(error_guard);

            let app_layer = fmt::layer()
                .with_writer(app_writer)
                .with_ansi(false)
                .with_target(config.target);
            let error_layer = fmt::layer()
                .with_writer(error_writer)
                .with_ansi(false)
                .with_target(config.target)
                .with_filter(LevelFilter::ERROR);

            (Some(app_layer), Some(error_layer))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(json_layer)
        .with(pretty_layer)
        .with(app_file_layer)
        .with(error_file_layer)
        .try_init()
        .map_err(|_| TracingError::AlreadyInitialized)?;

    Ok(TracingGuard { _workers: workers })
}

fn rolling_file(dir: &Path, prefix: &str) -> Result<RollingFileAppender, TracingError> {
    Ok(RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(LOG_FILES_KEPT)
        .build(dir)?)
}

/// Tracing initialization errors
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing subscriber already initialized")]
    AlreadyInitialized,

    #[error("Failed to create log directory {path:?}: {source}")]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open log file: {0}")]
    LogFile(#[from] InitError),
}
