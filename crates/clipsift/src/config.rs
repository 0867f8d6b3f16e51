//! Configuration management for clipsift.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "clipsift";

/// Default archive database file name.
const DATABASE_FILE_NAME: &str = "archive.db";

/// Default processing state file name.
const STATE_FILE_NAME: &str = "processing_state.json";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `CLIPSIFT_`)
/// 2. TOML config file at `~/.config/clipsift/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Security filter configuration.
    pub security: SecurityConfig,
    /// Duplicate suppression configuration.
    pub dedup: DedupConfig,
    /// Processing state tracker configuration.
    pub processing: ProcessingConfig,
    /// Service loop configuration.
    pub service: ServiceConfig,
    /// Archive storage configuration.
    pub storage: StorageConfig,
}

/// A custom detection rule supplied through configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPattern {
    /// The regex pattern text.
    pub pattern: String,
    /// Name of the rule, used in match reports.
    pub name: String,
    /// Category group the rule is registered under.
    #[serde(default = "default_custom_group")]
    pub group: String,
}

fn default_custom_group() -> String {
    "custom".to_string()
}

/// Security filter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Replace matched spans with redaction markers.
    pub enable_redaction: bool,
    /// Skip items entirely when a high-severity match is found.
    pub skip_sensitive: bool,
    /// Custom detection rules added on top of the built-ins.
    pub custom_patterns: Vec<CustomPattern>,
}

/// Duplicate suppression configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Rolling window in seconds within which an identical item is a duplicate.
    pub window_seconds: u64,
    /// Maximum number of content hashes remembered by the gate.
    pub max_cache_size: usize,
}

/// Processing state tracker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Maximum delivery attempts per item before it is terminally failed.
    pub max_retry_attempts: u32,
    /// Age in hours after which processing records are swept.
    pub record_max_age_hours: u32,
    /// Path to the persisted state file.
    /// Defaults to `~/.local/share/clipsift/processing_state.json`
    pub state_path: Option<PathBuf>,
}

/// Service loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Interval between source polls in milliseconds.
    pub poll_interval_ms: u64,
    /// Minimum content length to process.
    pub min_content_length: usize,
    /// Maximum content length to process.
    pub max_content_length: usize,
    /// Directory watched by the spool source.
    /// Defaults to `~/.local/share/clipsift/spool`
    pub spool_dir: Option<PathBuf>,
    /// Directory the backup sink writes to.
    /// Defaults to `~/.local/share/clipsift/backup`
    pub backup_dir: Option<PathBuf>,
}

/// Archive storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the archive database file.
    /// Defaults to `~/.local/share/clipsift/archive.db`
    pub database_path: Option<PathBuf>,
    /// Maximum number of archived items to retain.
    /// Set to 0 for unlimited.
    pub max_items: usize,
    /// Maximum age of archived items to retain in days.
    /// Set to 0 for unlimited.
    pub max_age_days: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_redaction: true,
            skip_sensitive: false,
            custom_patterns: Vec::new(),
        }
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            window_seconds: 1800,
            max_cache_size: 100,
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_retry_attempts: 3,
            record_max_age_hours: 24,
            state_path: None,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            min_content_length: 1,
            max_content_length: 1_000_000, // 1MB max
            spool_dir: None,
            backup_dir: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Resolved to default at runtime
            max_items: 100_000,
            max_age_days: 30,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `CLIPSIFT_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("CLIPSIFT_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// Custom detection rules are compiled here so that a malformed pattern
    /// fails the load immediately instead of surfacing during a scan.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.service.min_content_length > self.service.max_content_length {
            return Err(Error::ConfigValidation {
                message: format!(
                    "min_content_length ({}) cannot be greater than max_content_length ({})",
                    self.service.min_content_length, self.service.max_content_length
                ),
            });
        }

        if self.service.poll_interval_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "poll_interval_ms must be greater than 0".to_string(),
            });
        }

        if self.dedup.window_seconds == 0 {
            return Err(Error::ConfigValidation {
                message: "dedup window_seconds must be greater than 0".to_string(),
            });
        }

        if self.processing.max_retry_attempts == 0 {
            return Err(Error::ConfigValidation {
                message: "max_retry_attempts must be greater than 0".to_string(),
            });
        }

        for custom in &self.security.custom_patterns {
            if let Err(e) = regex::Regex::new(&custom.pattern) {
                return Err(Error::ConfigValidation {
                    message: format!("invalid pattern '{}': {e}", custom.name),
                });
            }
        }

        Ok(())
    }

    /// Get the archive database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the state file path, resolving defaults if not set.
    #[must_use]
    pub fn state_path(&self) -> PathBuf {
        self.processing
            .state_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(STATE_FILE_NAME))
    }

    /// Get the spool directory, resolving defaults if not set.
    #[must_use]
    pub fn spool_dir(&self) -> PathBuf {
        self.service
            .spool_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("spool"))
    }

    /// Get the backup directory, resolving defaults if not set.
    #[must_use]
    pub fn backup_dir(&self) -> PathBuf {
        self.service
            .backup_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("backup"))
    }

    /// Get the dedup window as a Duration.
    #[must_use]
    pub fn dedup_window(&self) -> Duration {
        Duration::from_secs(self.dedup.window_seconds)
    }

    /// Get the poll interval as a Duration.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.service.poll_interval_ms)
    }

    /// Get the archive max age as a Duration.
    #[must_use]
    pub fn archive_max_age(&self) -> Option<Duration> {
        if self.storage.max_age_days == 0 {
            None
        } else {
            Some(Duration::from_secs(
                u64::from(self.storage.max_age_days) * 24 * 60 * 60,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.security.enable_redaction);
        assert!(!config.security.skip_sensitive);
        assert!(config.security.custom_patterns.is_empty());
        assert_eq!(config.dedup.window_seconds, 1800);
        assert_eq!(config.dedup.max_cache_size, 100);
        assert_eq!(config.processing.max_retry_attempts, 3);
        assert_eq!(config.processing.record_max_age_hours, 24);
    }

    #[test]
    fn test_default_service_config() {
        let service = ServiceConfig::default();

        assert_eq!(service.poll_interval_ms, 2000);
        assert_eq!(service.min_content_length, 1);
        assert_eq!(service.max_content_length, 1_000_000);
        assert!(service.spool_dir.is_none());
        assert!(service.backup_dir.is_none());
    }

    #[test]
    fn test_default_storage_config() {
        let storage = StorageConfig::default();

        assert!(storage.database_path.is_none());
        assert_eq!(storage.max_items, 100_000);
        assert_eq!(storage.max_age_days, 30);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_content_length() {
        let mut config = Config::default();
        config.service.min_content_length = 1000;
        config.service.max_content_length = 100;

        let result = config.validate();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("min_content_length"));
    }

    #[test]
    fn test_validate_zero_poll_interval() {
        let mut config = Config::default();
        config.service.poll_interval_ms = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("poll_interval_ms"));
    }

    #[test]
    fn test_validate_zero_dedup_window() {
        let mut config = Config::default();
        config.dedup.window_seconds = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("window_seconds"));
    }

    #[test]
    fn test_validate_zero_retry_attempts() {
        let mut config = Config::default();
        config.processing.max_retry_attempts = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("max_retry_attempts"));
    }

    #[test]
    fn test_validate_invalid_custom_pattern() {
        let mut config = Config::default();
        config.security.custom_patterns = vec![CustomPattern {
            pattern: "[invalid".to_string(),
            name: "broken".to_string(),
            group: "custom".to_string(),
        }];

        let result = config.validate();
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("broken"));
    }

    #[test]
    fn test_validate_valid_custom_pattern() {
        let mut config = Config::default();
        config.security.custom_patterns = vec![CustomPattern {
            pattern: r"\bSECRET_\d+\b".to_string(),
            name: "internal_secret".to_string(),
            group: "custom".to_string(),
        }];

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_pattern_default_group() {
        let json = r#"{"pattern": "x", "name": "n"}"#;
        let custom: CustomPattern = serde_json::from_str(json).unwrap();
        assert_eq!(custom.group, "custom");
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config
            .database_path()
            .to_string_lossy()
            .contains("archive.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_state_path_default() {
        let config = Config::default();
        assert!(config
            .state_path()
            .to_string_lossy()
            .contains("processing_state.json"));
    }

    #[test]
    fn test_spool_and_backup_dirs() {
        let config = Config::default();
        assert!(config.spool_dir().to_string_lossy().contains("spool"));
        assert!(config.backup_dir().to_string_lossy().contains("backup"));
    }

    #[test]
    fn test_dedup_window() {
        let config = Config::default();
        assert_eq!(config.dedup_window(), Duration::from_secs(1800));
    }

    #[test]
    fn test_poll_interval() {
        let config = Config::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(2000));
    }

    #[test]
    fn test_archive_max_age_none_when_zero() {
        let mut config = Config::default();
        config.storage.max_age_days = 0;
        assert!(config.archive_max_age().is_none());
    }

    #[test]
    fn test_archive_max_age_some_when_set() {
        let config = Config::default();
        assert_eq!(
            config.archive_max_age().unwrap(),
            Duration::from_secs(30 * 24 * 60 * 60)
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("clipsift"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());

        let config = result.unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_serialize_round_trip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_security_config_deserialize() {
        let json = r#"{"enable_redaction": false, "skip_sensitive": true}"#;
        let security: SecurityConfig = serde_json::from_str(json).unwrap();
        assert!(!security.enable_redaction);
        assert!(security.skip_sensitive);
    }

    #[test]
    fn test_dedup_config_deserialize() {
        let json = r#"{"window_seconds": 60, "max_cache_size": 10}"#;
        let dedup: DedupConfig = serde_json::from_str(json).unwrap();
        assert_eq!(dedup.window_seconds, 60);
        assert_eq!(dedup.max_cache_size, 10);
    }
}
