//! Configuration module for organbank-console.
//!
//! Reads the optional TOML file, applies CLI and environment overrides and
//! validates the result.

pub mod file;

use crate::config::file::FileConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Validated runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: Url,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub highlight_ttl: Duration,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    base_url_override: Option<Url>,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, base_url_override: Option<Url>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            base_url_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// A missing file is not an error: every setting has a default.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let mut file_config = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = ?self.config_path, "No config file, using defaults");
                FileConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(base_url) = &self.base_url_override {
            file_config.gateway.base_url = base_url.clone();
        }

        self.validate(&file_config)?;

        Ok(Settings {
            base_url: file_config.gateway.base_url,
            request_timeout: Duration::from_secs(file_config.gateway.timeout_secs),
            poll_interval: Duration::from_secs(file_config.dashboard.poll_interval_secs),
            highlight_ttl: Duration::from_secs(file_config.dashboard.highlight_secs),
        })
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        if !matches!(config.gateway.base_url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "gateway.base_url must be http or https, got {}",
                config.gateway.base_url
            )));
        }
        let intervals = [
            ("gateway.timeout_secs", config.gateway.timeout_secs),
            ("dashboard.poll_interval_secs", config.dashboard.poll_interval_secs),
            ("dashboard.highlight_secs", config.dashboard.highlight_secs),
        ];
        for (key, value) in intervals {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{key} must be greater than zero"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "organbank-{}-{name}.toml",
            std::process::id()
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = ConfigLoader::new("/nonexistent/organbank.toml", None)
            .load()
            .unwrap();
        assert_eq!(settings.base_url.as_str(), "http://localhost:8081/");
        assert_eq!(settings.request_timeout, Duration::from_secs(10));
        assert_eq!(settings.poll_interval, Duration::from_secs(5));
        assert_eq!(settings.highlight_ttl, Duration::from_secs(5));
    }

    #[test]
    fn test_override_wins_over_file() {
        let path = write_config("override", "[gateway]\nbase_url = \"http://file:1/\"\n");
        let cli = Url::parse("http://cli:2/").unwrap();

        let settings = ConfigLoader::new(&path, Some(cli.clone())).load().unwrap();
        assert_eq!(settings.base_url, cli);

        let settings = ConfigLoader::new(&path, None).load().unwrap();
        assert_eq!(settings.base_url.as_str(), "http://file:1/");
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let path = write_config("zero", "[dashboard]\npoll_interval_secs = 0\n");
        let err = ConfigLoader::new(&path, None).load().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("poll_interval")));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_non_http_scheme_is_rejected() {
        let cli = Url::parse("ftp://files.example.org/").unwrap();
        let err = ConfigLoader::new("/nonexistent/organbank.toml", Some(cli))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let path = write_config("malformed", "[gateway\n");
        let err = ConfigLoader::new(&path, None).load().unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        std::fs::remove_file(path).unwrap();
    }
}
