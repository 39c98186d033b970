///! Logging configuration module
///! Console output plus optional rolling JSON files

use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config;

const LOG_FILE_NAME: &str = "nsregistry.log";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,             // default filter when RUST_LOG is unset
    pub log_dir: Option<PathBuf>,  // rolling file output directory
    pub rotation: LogRotation,     // log rotation policy
    pub json_format: bool,         // JSON on the console too
}

/// Log rotation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

impl LogRotation {
    pub fn parse(value: &str) -> Self {
        match value {
            "hourly" => LogRotation::Hourly,
            "never" => LogRotation::Never,
            _ => LogRotation::Daily,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            rotation: LogRotation::Daily,
            json_format: false,
        }
    }
}

impl From<&config::LoggingConfig> for LoggingConfig {
    fn from(settings: &config::LoggingConfig) -> Self {
        Self {
            level: settings.level.clone(),
            log_dir: settings.log_dir.clone(),
            rotation: LogRotation::parse(&settings.rotation),
            json_format: settings.json_format,
        }
    }
}

impl LoggingConfig {
    /// Install the global subscriber.
    ///
    /// The returned guard flushes the file writer; keep it alive for the
    /// lifetime of the process.
    pub fn init(&self) -> anyhow::Result<Option<WorkerGuard>> {
        let env_filter =
            EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&self.level))?;

        let console_layer = if self.json_format {
            fmt::layer()
                .with_target(true)
                .json()
                .with_writer(io::stdout)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(true)
                .with_writer(io::stdout)
                .boxed()
        };

        let (file_layer, guard) = match self.log_dir {
            Some(ref dir) => {
                std::fs::create_dir_all(dir)?;
                let appender = match self.rotation {
                    LogRotation::Hourly => rolling::hourly(dir, LOG_FILE_NAME),
                    LogRotation::Daily => rolling::daily(dir, LOG_FILE_NAME),
                    LogRotation::Never => rolling::never(dir, LOG_FILE_NAME),
                };
                let (writer, guard) = non_blocking(appender);

                let layer = fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_ansi(false)
                    .json()
                    .with_writer(writer);

                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()?;

        tracing::info!(level = %self.level, file_logging = self.log_dir.is_some(), "Logging initialized");

        Ok(guard)
    }
}
