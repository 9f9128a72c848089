//! Logging setup
//!
//! - Format: `compact` (default) or `json`, from `--log-format` or `SSRANK_LOG_FORMAT`
//! - Filter: `RUST_LOG`, default `info`
//! - Output goes to stderr so stdout carries only command results

use clap::ValueEnum;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static TRACING: OnceLock<LogFormat> = OnceLock::new();

/// Supported log output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable single-line events
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    fn from_env_value(v: &str) -> Self {
        match v.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Logging configuration from environment
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub filter: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let format = std::env::var("SSRANK_LOG_FORMAT")
            .map(|v| LogFormat::from_env_value(&v))
            .unwrap_or_default();
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        Self { format, filter }
    }
}

/// Initialize tracing once; later calls return the format chosen first.
pub fn init_logging(format_override: Option<LogFormat>) -> LogFormat {
    *TRACING.get_or_init(|| {
        let mut config = LoggingConfig::from_env();
        if let Some(format) = format_override {
            config.format = format;
        }

        let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true);
        let _ = match config.format {
            LogFormat::Json => builder.json().try_init(),
            LogFormat::Compact => builder.compact().try_init(),
        };
        tracing::debug!(format = ?config.format, "tracing initialized");
        config.format
    })
}
