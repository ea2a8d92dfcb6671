//! Configuration infrastructure
//!
//! The extractor is configured from a file (any format the `config` crate
//! understands) overlaid with `MBASIC_`-prefixed environment variables, e.g.
//! `MBASIC_LOGGING__LEVEL=debug`. Every section has defaults, so a file only
//! needs the values it changes.

use crate::domain::PageKind;
use crate::infrastructure::parsing::config::ParsingConfig;
use crate::infrastructure::parsing::rules::{compile_rules, compile_selector};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

const ENV_PREFIX: &str = "MBASIC";
const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config from file: {source}")]
    FileLoad {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Complete extractor configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub logging: LoggingConfig,
    pub parsing: ParsingConfig,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory receiving the log file
    pub log_directory: PathBuf,

    pub file_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_directory: PathBuf::from("logs"),
            file_name: "mbasic-parser.log".to_string(),
        }
    }
}

impl ExtractorConfig {
    /// Load from a file plus environment overrides, then validate.
    ///
    /// Both are layered over the defaults key by key, so overriding one field
    /// of a page schema keeps the rest of it.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// Defaults plus environment overrides, for callers without a config file
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logging.validate()?;

        for kind in PageKind::ALL {
            let schema = self.parsing.schema(kind);
            if schema.containers.is_empty() {
                return Err(ConfigError::Validation {
                    message: format!("{kind} needs at least one container selector"),
                });
            }
            for selector in &schema.containers {
                compile_selector(selector).map_err(|e| ConfigError::Validation {
                    message: format!("{kind} container: {e}"),
                })?;
            }
            compile_rules(&schema.items)
                .and_then(|_| compile_rules(&schema.see_more))
                .map_err(|e| ConfigError::Validation {
                    message: format!("{kind} rules: {e}"),
                })?;
        }

        if self.parsing.post.participant_suffixes.is_empty() {
            return Err(ConfigError::Validation {
                message: "post.participant_suffixes must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::Validation {
                message: format!("unknown log level '{}'", self.level),
            });
        }
        if !self.console_output && !self.file_output {
            return Err(ConfigError::Validation {
                message: "no logging output configured".to_string(),
            });
        }
        if self.file_output && self.file_name.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "file_name must be set when file_output is enabled".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ExtractorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(
            r##"
            [logging]
            level = "debug"

            [parsing.timeline]
            containers = ["#tlFeed"]
            "##,
        );
        let config = ExtractorConfig::from_file(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.console_output);
        let defaults = ParsingConfig::default();
        assert_eq!(config.parsing.timeline.containers, vec!["#tlFeed"]);
        assert_eq!(config.parsing.timeline.items, defaults.timeline.items);
        assert_eq!(config.parsing.timeline.see_more, defaults.timeline.see_more);
        assert_eq!(config.parsing.friends, defaults.friends);
        assert_eq!(config.parsing.post, defaults.post);
    }

    #[test]
    fn test_nested_rule_field_override() {
        let file = write_config(
            r#"
            [parsing.presence]
            sentinel = "while(1);"

            [parsing.profile_fields]
            relationship_section = "div#rel"
            "#,
        );
        let config = ExtractorConfig::from_file(file.path().to_str().unwrap()).unwrap();
        let defaults = ParsingConfig::default();

        assert_eq!(config.parsing.presence.sentinel, "while(1);");
        assert_eq!(config.parsing.presence.list_key, defaults.presence.list_key);
        assert_eq!(config.parsing.profile_fields.relationship_section, "div#rel");
        assert_eq!(
            config.parsing.profile_fields.titled_fields,
            defaults.profile_fields.titled_fields
        );
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let file = write_config(
            r#"
            [parsing.reaction]
            containers = ["div[["]
            "#,
        );
        let error = ExtractorConfig::from_file(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(error, ConfigError::Validation { .. }));
    }

    #[test]
    fn test_missing_file() {
        let error = ExtractorConfig::from_file("/nonexistent/mbasic-parser").unwrap_err();
        assert!(matches!(error, ConfigError::FileLoad { .. }));
    }

    #[test]
    fn test_logging_validation() {
        let mut config = ExtractorConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "WARN".to_string();
        assert!(config.validate().is_ok());

        config.logging.console_output = false;
        assert!(config.validate().is_err());

        config.logging.file_output = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_container_list_is_rejected() {
        let mut config = ExtractorConfig::default();
        config.parsing.likes.containers.clear();
        assert!(config.validate().is_err());
    }
}
