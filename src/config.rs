//! Configuration management for Silo
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, SiloError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Silo
///
/// This structure holds all configuration needed for the session store,
/// including the database location and chunking behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database location settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Session store behavior settings
    #[serde(default)]
    pub store: StoreConfig,
}

/// Database location configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the database directory
    ///
    /// When unset, the database lives in the platform data directory
    /// (overridable with the `SILO_DB` environment variable).
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Session store behavior configuration
///
/// `max_messages_per_chunk` is the single place the chunk capacity is
/// configured; every rollover decision reads it from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of messages held by one chunk document
    #[serde(default = "default_max_messages_per_chunk")]
    pub max_messages_per_chunk: usize,

    /// Attempts for the conditional session-metadata write before
    /// giving up with a conflict error (initial try included)
    #[serde(default = "default_session_update_attempts")]
    pub session_update_attempts: u32,
}

fn default_max_messages_per_chunk() -> usize {
    100
}

fn default_session_update_attempts() -> u32 {
    2
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_messages_per_chunk: default_max_messages_per_chunk(),
            session_update_attempts: default_session_update_attempts(),
        }
    }
}

impl Config {
    /// Load configuration from a file with environment and CLI overrides
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed CLI arguments whose overrides are applied last
    ///
    /// # Errors
    ///
    /// Returns `SiloError::Config` if the file exists but cannot be read
    /// or parsed.
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SiloError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| SiloError::Config(format!("Failed to parse config: {}", e)).into())
    }

    /// Apply environment variable overrides
    ///
    /// `SILO_MAX_MESSAGES_PER_CHUNK` overrides the chunk capacity. The
    /// database path override (`SILO_DB`) is honored by the document store
    /// itself so library users get it without loading a config file.
    fn apply_env_vars(&mut self) {
        if let Ok(value) = std::env::var("SILO_MAX_MESSAGES_PER_CHUNK") {
            match value.parse::<usize>() {
                Ok(n) => self.store.max_messages_per_chunk = n,
                Err(_) => {
                    tracing::warn!(
                        "Ignoring non-numeric SILO_MAX_MESSAGES_PER_CHUNK value: {}",
                        value
                    );
                }
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(size) = cli.chunk_size {
            self.store.max_messages_per_chunk = size;
        }
        if let Some(db) = &cli.db {
            self.storage.path = Some(PathBuf::from(db));
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `SiloError::Config` if any value is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.store.max_messages_per_chunk == 0 {
            return Err(SiloError::Config(
                "max_messages_per_chunk must be greater than 0".to_string(),
            )
            .into());
        }

        if self.store.max_messages_per_chunk > 10_000 {
            return Err(SiloError::Config(
                "max_messages_per_chunk must be less than or equal to 10000".to_string(),
            )
            .into());
        }

        if self.store.session_update_attempts == 0 {
            return Err(SiloError::Config(
                "session_update_attempts must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use serial_test::serial;

    fn cli_with(chunk_size: Option<usize>, db: Option<String>) -> Cli {
        Cli {
            config: None,
            verbose: false,
            db,
            chunk_size,
            command: Commands::Show {
                session: "s".to_string(),
            },
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store.max_messages_per_chunk, 100);
        assert_eq!(config.store.session_update_attempts, 2);
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
storage:
  path: /tmp/silo-test
store:
  max_messages_per_chunk: 10
"#;
        let config: Config = serde_yaml::from_str(yaml).expect("parse failed");
        assert_eq!(config.store.max_messages_per_chunk, 10);
        // Unspecified fields take their defaults
        assert_eq!(config.store.session_update_attempts, 2);
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/silo-test")));
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let mut config = Config::default();
        config.store.max_messages_per_chunk = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_chunk_size() {
        let mut config = Config::default();
        config.store.max_messages_per_chunk = 10_001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.store.session_update_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_missing_file_uses_defaults() {
        std::env::remove_var("SILO_MAX_MESSAGES_PER_CHUNK");
        let cli = cli_with(None, None);
        let config = Config::load("/nonexistent/silo.yaml", &cli).expect("load failed");
        assert_eq!(config.store.max_messages_per_chunk, 100);
    }

    #[test]
    #[serial]
    fn test_env_var_overrides_chunk_size() {
        std::env::set_var("SILO_MAX_MESSAGES_PER_CHUNK", "25");
        let cli = cli_with(None, None);
        let config = Config::load("/nonexistent/silo.yaml", &cli).expect("load failed");
        assert_eq!(config.store.max_messages_per_chunk, 25);
        std::env::remove_var("SILO_MAX_MESSAGES_PER_CHUNK");
    }

    #[test]
    #[serial]
    fn test_cli_override_wins_over_env() {
        std::env::set_var("SILO_MAX_MESSAGES_PER_CHUNK", "25");
        let cli = cli_with(Some(7), Some("/tmp/silo-cli".to_string()));
        let config = Config::load("/nonexistent/silo.yaml", &cli).expect("load failed");
        assert_eq!(config.store.max_messages_per_chunk, 7);
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/silo-cli")));
        std::env::remove_var("SILO_MAX_MESSAGES_PER_CHUNK");
    }

    #[test]
    #[serial]
    fn test_invalid_env_var_is_ignored() {
        std::env::set_var("SILO_MAX_MESSAGES_PER_CHUNK", "lots");
        let cli = cli_with(None, None);
        let config = Config::load("/nonexistent/silo.yaml", &cli).expect("load failed");
        assert_eq!(config.store.max_messages_per_chunk, 100);
        std::env::remove_var("SILO_MAX_MESSAGES_PER_CHUNK");
    }
}
