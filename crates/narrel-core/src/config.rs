//! narrel Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with defaults suitable for English input.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Relation extraction options
    pub extraction: ExtractionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(lang) = std::env::var("NARREL_LANG") {
            config.extraction.default_language = lang;
        }
        if let Ok(value) = std::env::var("NARREL_REDUCE") {
            config.extraction.reduce = parse_bool("NARREL_REDUCE", &value)?;
        }
        if let Ok(value) = std::env::var("NARREL_SKIP_PUNCT") {
            config.extraction.skip_punct = parse_bool("NARREL_SKIP_PUNCT", &value)?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(value) = std::env::var("LOG_JSON") {
            config.logging.json_format = parse_bool("LOG_JSON", &value)?;
        }
        if let Ok(value) = std::env::var("LOG_LOCATION") {
            config.logging.include_location = parse_bool("LOG_LOCATION", &value)?;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        Self::from_toml(&content).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError { path, message },
            other => other,
        })
    }

    /// Parse TOML content
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::new(),
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let defaults = Self::default();

        // Only override if env values differ from defaults
        if env_config.extraction.default_language != defaults.extraction.default_language {
            self.extraction.default_language = env_config.extraction.default_language;
        }
        if env_config.extraction.reduce != defaults.extraction.reduce {
            self.extraction.reduce = env_config.extraction.reduce;
        }
        if env_config.extraction.skip_punct != defaults.extraction.skip_punct {
            self.extraction.skip_punct = env_config.extraction.skip_punct;
        }
        if env_config.logging.level != defaults.logging.level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format != defaults.logging.json_format {
            self.logging.json_format = env_config.logging.json_format;
        }
        if env_config.logging.include_location != defaults.logging.include_location {
            self.logging.include_location = env_config.logging.include_location;
        }

        Ok(self)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Relation extraction configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Language code used when the input does not declare one
    pub default_language: String,

    /// Collapse duplicate relations before output
    pub reduce: bool,

    /// Ignore dependency edges whose dependent is punctuation
    pub skip_punct: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            reduce: false,
            skip_punct: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl From<ConfigError> for crate::NarrelError {
    fn from(err: ConfigError) -> Self {
        crate::NarrelError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.extraction.default_language, "en");
        assert!(!config.extraction.reduce);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [extraction]
            default_language = "ru"
            reduce = true
            "#,
        )
        .unwrap();
        assert_eq!(config.extraction.default_language, "ru");
        assert!(config.extraction.reduce);
        assert!(!config.extraction.skip_punct);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_toml() {
        let result = AppConfig::from_toml("[extraction\nreduce = 1");
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_location_env_override() {
        std::env::set_var("LOG_LOCATION", "on");
        let config = AppConfig::default().with_env_override();
        std::env::remove_var("LOG_LOCATION");

        assert!(config.unwrap().logging.include_location);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("X", "yes").unwrap());
        assert!(!parse_bool("X", "0").unwrap());
        assert!(parse_bool("X", "maybe").is_err());
    }
}
