//! Logging configuration and subscriber setup

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

type BoxedSubscriber = Box<dyn tracing::Subscriber + Send + Sync>;

/// Logging configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global log level
    pub level: LogLevel,
    /// Output format
    pub format: LogFormat,
    /// Append-only log file, written in addition to stderr
    pub file: Option<PathBuf>,
    /// Include target module information
    pub target: bool,
}

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line format
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON lines for structured ingestion
    Json,
}

impl LogLevel {
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(level_str: &str) -> Result<Self, Self::Err> {
        match level_str.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            )),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(format_str: &str) -> Result<Self, Self::Err> {
        match format_str.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!(
                "Invalid log format: {}. Valid formats: pretty, compact, json",
                format_str
            )),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            file: None,
            target: false,
        }
    }
}

/// Logging system manager
pub struct LoggingSystem {
    config: LoggingConfig,
}

impl LoggingSystem {
    /// Create a new logging system with configuration
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }

    fn build_subscriber(&self) -> Result<BoxedSubscriber, Box<dyn std::error::Error + Send + Sync>> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(self.config.level.as_filter()))?;

        let (writer, ansi) = match &self.config.file {
            Some(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                (
                    BoxMakeWriter::new(std::io::stderr.and(Mutex::new(file))),
                    false,
                )
            }
            None => (
                BoxMakeWriter::new(std::io::stderr),
                std::io::stderr().is_terminal(),
            ),
        };

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(self.config.target);

        Ok(match self.config.format {
            LogFormat::Pretty => Box::new(builder.pretty().finish()),
            LogFormat::Compact => Box::new(builder.compact().finish()),
            LogFormat::Json => Box::new(builder.json().finish()),
        })
    }

    /// Install the global subscriber; `RUST_LOG` wins over the configured level
    pub fn initialize(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::subscriber::set_global_default(self.build_subscriber()?)?;

        tracing::debug!(
            "Logging system initialized with level: {:?}",
            self.config.level
        );
        Ok(())
    }

    /// Run `f` with this configuration active for the current thread only.
    ///
    /// Covers work that happens before the final configuration is known, such as
    /// resolving the configuration itself.
    pub fn scoped<T>(&self, f: impl FnOnce() -> T) -> T {
        match self.build_subscriber() {
            Ok(subscriber) => tracing::subscriber::with_default(subscriber, f),
            Err(_) => f(),
        }
    }

    /// Log system information
    pub fn log_system_info(&self) {
        tracing::info!("=== ZipScale ===");
        tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
        tracing::debug!("Logging level: {:?}", self.config.level);
        tracing::debug!("Output format: {:?}", self.config.format);
        if let Some(file) = &self.config.file {
            tracing::info!("Log file: {}", file.display());
        }
    }
}
