//! Logging system configuration and initialization
//!
//! - Console output and optional file output
//! - Structured JSON file logs (optional)
//! - `RUST_LOG` overrides the configured level

use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use crate::infrastructure::config::LoggingConfig;

/// Keeps the file writer alive for the life of the process
static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Initialize the logging system with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

/// Build the level filter for this crate and its dependencies.
///
/// Outside of `trace`, the HTML parser stack is held at `warn`.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let level = config.level.to_lowercase();
    let mut filter = EnvFilter::try_new(&level)?
        .add_directive(format!("mbasic_parser={level}").parse()?);
    if level != "trace" {
        filter = filter
            .add_directive("html5ever=warn".parse()?)
            .add_directive("selectors=warn".parse()?)
            .add_directive("scraper=warn".parse()?);
    }
    Ok(filter)
}

/// Initialize logging with custom configuration.
///
/// Safe to call more than once: only the first successful call installs a
/// subscriber, later calls return `Ok(())` and leave it in place.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    config.validate()?;
    if FILE_GUARD.get().is_some() || tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let filter = build_filter(config)?;
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if config.console_output {
        layers.push(fmt::layer().with_target(false).boxed());
    }

    if config.file_output {
        std::fs::create_dir_all(&config.log_directory).map_err(|e| {
            anyhow!(
                "Failed to create log directory {:?}: {}",
                config.log_directory,
                e
            )
        })?;
        let appender = rolling::never(&config.log_directory, &config.file_name);
        let (writer, guard) = non_blocking(appender);

        let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
        layers.push(if config.json_format {
            file_layer
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .boxed()
        } else {
            file_layer.with_target(false).boxed()
        });

        if FILE_GUARD.set(guard).is_err() {
            return Ok(());
        }
    }

    if Registry::default().with(layers).with(filter).try_init().is_err() {
        // Another subscriber won the race; ours is dropped.
        return Ok(());
    }

    info!(
        "Logging initialized (level: {}, console: {}, file: {}, json: {})",
        config.level, config.console_output, config.file_output, config.json_format
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_uses_configured_level() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            ..LoggingConfig::default()
        };
        if std::env::var("RUST_LOG").is_err() {
            let filter = build_filter(&config).unwrap().to_string();
            assert!(filter.contains("mbasic_parser=debug"));
            assert!(filter.contains("html5ever=warn"));
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = LoggingConfig {
            console_output: false,
            file_output: false,
            ..LoggingConfig::default()
        };
        assert!(init_logging_with_config(&config).is_err());
    }

    #[test]
    fn test_repeated_initialization_is_harmless() {
        assert!(init_logging().is_ok());
        assert!(init_logging().is_ok());
    }
}
