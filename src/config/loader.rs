use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::{Config, MAX_DELAY_MS};

/// Why a `listsync.toml` (or inline TOML) could not become a [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Parses and validates configuration text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The debounce delay is at most one minute
    /// - Pages hold at least one record
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce.delay_ms > MAX_DELAY_MS {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "debounce.delay_ms must be at most {}, got {}",
                    MAX_DELAY_MS, self.debounce.delay_ms
                ),
            });
        }

        if self.source.page_size == 0 {
            return Err(ConfigError::ValidationError {
                message: "source.page_size must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SectioningMode;

    #[test]
    fn empty_text_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.debounce.delay_ms, 250);
        assert_eq!(config.source.page_size, 100);
        assert_eq!(config.source.sectioning, SectioningMode::SourceOrder);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let result = Config::from_toml_str("[source]\npage_size = 0\n");
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn unknown_sectioning_fails_to_parse() {
        let result = Config::from_toml_str("[source]\nsectioning = \"alphabetical\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }
}
