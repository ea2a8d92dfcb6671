//! Infrastructure layer: page parsing, date normalization, configuration and logging

pub mod config;
pub mod date_normalizer;
pub mod logging;
pub mod parsing;
pub mod parsing_error;

// Re-export commonly used items
pub use config::{ConfigError, ExtractorConfig, LoggingConfig};
pub use date_normalizer::{ChronoDateNormalizer, DateNormalizer};
pub use logging::{init_logging, init_logging_with_config};
pub use parsing::{PageParser, ParsingConfig};
pub use parsing_error::{ParsingError, ParsingResult};
