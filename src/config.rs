use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::session::{Capacity, CapacityError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub capacity: CapacityConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    pub paths: PathsConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Product count bounds for one batch
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CapacityConfig {
    #[serde(default = "default_minimum_products")]
    pub minimum: usize,
    #[serde(default = "default_maximum_products")]
    pub maximum: usize,
}

fn default_minimum_products() -> usize {
    3
}

fn default_maximum_products() -> usize {
    10
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            minimum: default_minimum_products(),
            maximum: default_maximum_products(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsConfig {
    /// Largest accepted image, in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

fn default_max_file_size() -> u64 {
    5 * 1024 * 1024
}

fn default_allowed_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/webp".to_string(),
    ]
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            allowed_types: default_allowed_types(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the persisted session and logs
    pub state: String,
    pub database: String,
    pub uploads: String,
}

/// REST server and client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL the CLI talks to when not running with `--local`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Prefix for hosted image URLs. Falls back to `base_url`.
    #[serde(default)]
    pub public_url: Option<String>,
    /// Request timeout for the HTTP backend, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_port() -> u16 {
    7010
}

fn default_base_url() -> String {
    format!("http://localhost:{}", default_port())
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            base_url: default_base_url(),
            public_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether `serve` writes to a log file instead of stderr
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid capacity: {0}")]
    Capacity(#[from] CapacityError),

    #[error("uploads.max_file_size must be greater than zero")]
    ZeroFileSize,

    #[error("uploads.allowed_types must list at least one content type")]
    NoAllowedTypes,

    #[error("{field} must not be empty")]
    EmptyPath { field: &'static str },
}

impl Config {
    /// Path to the project-local config file
    pub fn local_config_path() -> PathBuf {
        PathBuf::from(".leadcollect/config.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let local_config = Self::local_config_path();
        if local_config.exists() {
            builder = builder.add_source(config::File::from(local_config));
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("leadcollect").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("LEADCOLLECT")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("uploads.allowed_types")
                .try_parsing(true),
        );

        let config: Config = builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Save config to the project-local config file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::local_config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        std::fs::write(&config_path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capacity()?;
        if self.uploads.max_file_size == 0 {
            return Err(ConfigError::ZeroFileSize);
        }
        if self.uploads.allowed_types.is_empty() {
            return Err(ConfigError::NoAllowedTypes);
        }
        for (field, value) in [
            ("paths.state", &self.paths.state),
            ("paths.database", &self.paths.database),
            ("paths.uploads", &self.paths.uploads),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyPath { field });
            }
        }
        Ok(())
    }

    pub fn capacity(&self) -> Result<Capacity, CapacityError> {
        Capacity::new(self.capacity.minimum, self.capacity.maximum)
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        absolute(&self.paths.state)
    }

    pub fn database_path(&self) -> PathBuf {
        absolute(&self.paths.database)
    }

    pub fn uploads_path(&self) -> PathBuf {
        absolute(&self.paths.uploads)
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }

    /// URL prefix hosted images are served under
    pub fn public_url(&self) -> String {
        self.api
            .public_url
            .clone()
            .unwrap_or_else(|| self.api.base_url.clone())
            .trim_end_matches('/')
            .to_string()
    }
}

fn absolute(path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: CapacityConfig::default(),
            uploads: UploadsConfig::default(),
            paths: PathsConfig {
                state: ".leadcollect".to_string(),
                database: ".leadcollect/leads.db".to_string(),
                uploads: ".leadcollect/uploads".to_string(),
            },
            api: ApiConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.capacity.minimum, 3);
        assert_eq!(config.capacity.maximum, 10);
        assert_eq!(config.uploads.max_file_size, 5 * 1024 * 1024);
        assert_eq!(config.uploads.allowed_types.len(), 3);
        assert_eq!(config.api.port, 7010);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_capacity_rejected() {
        let mut config = Config::default();
        config.capacity.minimum = 12;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Capacity(CapacityError::Inverted { .. }))
        ));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = Config::default();
        config.capacity.maximum = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_upload_limits_validated() {
        let mut config = Config::default();
        config.uploads.max_file_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroFileSize)));

        let mut config = Config::default();
        config.uploads.allowed_types.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoAllowedTypes)));
    }

    #[test]
    fn test_relative_paths_resolve_against_cwd() {
        let config = Config::default();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(config.state_path(), cwd.join(".leadcollect"));
        assert!(config.logs_path().ends_with(".leadcollect/logs"));
    }

    #[test]
    fn test_absolute_paths_kept() {
        let mut config = Config::default();
        config.paths.database = "/var/lib/leadcollect/leads.db".to_string();
        assert_eq!(
            config.database_path(),
            PathBuf::from("/var/lib/leadcollect/leads.db")
        );
    }

    #[test]
    fn test_public_url_falls_back_to_base_url() {
        let mut config = Config::default();
        config.api.base_url = "http://example.test:9000/".to_string();
        assert_eq!(config.public_url(), "http://example.test:9000");

        config.api.public_url = Some("https://cdn.example.test".to_string());
        assert_eq!(config.public_url(), "https://cdn.example.test");
    }

    #[test]
    fn test_partial_toml_uses_field_defaults() {
        let toml_str = r#"
            [capacity]
            minimum = 2

            [paths]
            state = "/tmp/state"
            database = "/tmp/state/leads.db"
            uploads = "/tmp/state/uploads"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.capacity.minimum, 2);
        assert_eq!(config.capacity.maximum, 10);
        assert_eq!(config.api.port, 7010);
        assert!(config.logging.to_file);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.paths.uploads, config.paths.uploads);
        assert_eq!(parsed.uploads.allowed_types, config.uploads.allowed_types);
    }
}
