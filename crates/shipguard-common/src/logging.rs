//! Logging configuration and initialization
//!
//! Centralized tracing setup for all Shipguard binaries. Supports console,
//! file (daily rotation), or both targets, in text or JSON format, with the
//! level and target configurable from the environment:
//!
//! - `LOG_LEVEL`: trace | debug | info | warn | error
//! - `LOG_OUTPUT`: console | file | both
//! - `LOG_FORMAT`: text | json
//! - `LOG_DIR`: directory for log files (default `./logs`)
//! - `LOG_FILTER`: extra filter directives, e.g. `sqlx=warn,tower_http=debug`
//!
//! Use the structured macros (`info!`, `warn!`, `error!`) with fields, never
//! `println!`:
//!
//! ```rust,ignore
//! tracing::info!(order_id = order.id, "order linked to remote record");
//! ```

use anyhow::{Context, Result};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    #[default]
    Console,
    File,
    Both,
}

/// Line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration for one binary.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub output: LogOutput,
    pub format: LogFormat,
    pub log_dir: String,
    pub file_prefix: String,
    pub filter_directives: Option<String>,
}

impl LogConfig {
    /// Build a configuration for the named binary, taking overrides from
    /// the environment.
    pub fn for_service(prefix: &str) -> Self {
        let output = match std::env::var("LOG_OUTPUT").ok().as_deref() {
            Some("file") => LogOutput::File,
            Some("both") | Some("all") => LogOutput::Both,
            _ => LogOutput::Console,
        };
        let format = match std::env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            output,
            format,
            log_dir: std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string()),
            file_prefix: prefix.to_string(),
            filter_directives: std::env::var("LOG_FILTER").ok(),
        }
    }
}

/// Initialize the global tracing subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let mut filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("invalid log level '{}'", config.level))?;

    if let Some(ref directives) = config.filter_directives {
        for directive in directives.split(',') {
            filter = filter.add_directive(
                directive
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid filter directive '{directive}'"))?,
            );
        }
    }

    let console = matches!(config.output, LogOutput::Console | LogOutput::Both);
    let file = matches!(config.output, LogOutput::File | LogOutput::Both);

    let file_writer = if file {
        std::fs::create_dir_all(&config.log_dir).context("failed to create log directory")?;
        let appender = tracing_appender::rolling::daily(&config.log_dir, &config.file_prefix);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        // The guard flushes on drop; keep it for the process lifetime.
        std::mem::forget(guard);
        Some(non_blocking)
    } else {
        None
    };

    let registry = tracing_subscriber::registry().with(filter);

    match (config.format, file_writer) {
        (LogFormat::Text, None) => {
            registry.with(console.then(|| fmt::layer())).try_init()?;
        }
        (LogFormat::Json, None) => {
            registry.with(console.then(|| fmt::layer().json())).try_init()?;
        }
        (LogFormat::Text, Some(writer)) => {
            registry
                .with(console.then(|| fmt::layer()))
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .try_init()?;
        }
        (LogFormat::Json, Some(writer)) => {
            registry
                .with(console.then(|| fmt::layer().json()))
                .with(fmt::layer().json().with_writer(writer).with_ansi(false))
                .try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn for_service_defaults() {
        let config = LogConfig::for_service("shipguard-test");
        assert_eq!(config.file_prefix, "shipguard-test");
        assert_eq!(config.log_dir, "./logs");
    }
}
