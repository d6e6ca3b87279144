//! Configuration management for studybuddy.
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

use crate::card::CardIdentity;
use crate::error::{Error, Result};
use crate::upload::UploadLimits;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "studybuddy";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "cards.db";

/// Bytes per configured megabyte.
const MB: u64 = 1024 * 1024;

/// Largest size limit, in MB, that still fits in a byte count.
const MAX_SIZE_MB: u64 = u64::MAX / MB;

/// Slot key the saved-card collection lives under.
pub const DEFAULT_SLOT_KEY: &str = "studybuddyai_saved_cards";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `STUDYBUDDY_`)
/// 2. TOML config file at `~/.config/studybuddy/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Upload limits.
    pub upload: UploadConfig,
    /// Generation service configuration.
    pub generation: GenerationConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/studybuddy/cards.db`
    pub database_path: Option<PathBuf>,
    /// Key of the durable slot holding the saved cards.
    pub slot_key: String,
    /// Largest value the slot accepts, in bytes.
    /// Set to 0 for unlimited.
    pub slot_quota_bytes: usize,
    /// How saved card ids are derived.
    pub identity: CardIdentity,
}

/// Upload-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Maximum number of files in one batch.
    pub max_files: usize,
    /// Maximum size of a single file in MB.
    pub max_file_size_mb: u64,
    /// Maximum combined size of a batch in MB.
    pub max_total_size_mb: u64,
    /// Upper bound on questions per file in batch mode.
    pub batch_max_questions: u32,
    /// Upper bound on questions for a single-file upload.
    pub single_max_questions: u32,
    /// Question count used when none is given.
    pub default_questions: u32,
}

/// Generation service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// URL the generation requests are posted to.
    pub endpoint: Option<String>,
    /// Bearer token sent with each request. Never written back out.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            slot_key: DEFAULT_SLOT_KEY.to_string(),
            slot_quota_bytes: 5 * 1024 * 1024,
            identity: CardIdentity::default(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_file_size_mb: 5,
            max_total_size_mb: 50,
            batch_max_questions: 10,
            single_max_questions: 20,
            default_questions: 3,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: 120,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
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
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("STUDYBUDDY_").split("__"));

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
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.slot_key.trim().is_empty() {
            return Err(invalid("slot_key must not be empty"));
        }

        let upload = &self.upload;
        if upload.max_files == 0 {
            return Err(invalid("max_files must be greater than 0"));
        }
        if upload.max_file_size_mb == 0 || upload.max_total_size_mb == 0 {
            return Err(invalid("file size limits must be greater than 0"));
        }
        if upload.max_total_size_mb > MAX_SIZE_MB {
            return Err(invalid(format!(
                "max_total_size_mb ({}) cannot exceed {MAX_SIZE_MB}",
                upload.max_total_size_mb
            )));
        }
        if upload.max_file_size_mb > upload.max_total_size_mb {
            return Err(invalid(format!(
                "max_file_size_mb ({}) cannot be greater than max_total_size_mb ({})",
                upload.max_file_size_mb, upload.max_total_size_mb
            )));
        }
        if upload.batch_max_questions == 0 || upload.single_max_questions == 0 {
            return Err(invalid("question limits must be greater than 0"));
        }
        if upload.default_questions == 0 || upload.default_questions > upload.batch_max_questions
        {
            return Err(invalid(format!(
                "default_questions ({}) must be between 1 and batch_max_questions ({})",
                upload.default_questions, upload.batch_max_questions
            )));
        }

        if self.generation.timeout_secs == 0 {
            return Err(invalid("timeout_secs must be greater than 0"));
        }
        if let Some(endpoint) = &self.generation.endpoint {
            if reqwest::Url::parse(endpoint).is_err() {
                return Err(invalid(format!("invalid generation endpoint: {endpoint}")));
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the slot quota, `None` when unlimited.
    #[must_use]
    pub fn slot_quota(&self) -> Option<usize> {
        match self.storage.slot_quota_bytes {
            0 => None,
            bytes => Some(bytes),
        }
    }

    /// Get the upload limits in bytes.
    #[must_use]
    pub fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            max_files: self.upload.max_files,
            max_file_size: self.upload.max_file_size_mb.saturating_mul(MB),
            max_total_size: self.upload.max_total_size_mb.saturating_mul(MB),
            batch_max_questions: self.upload.batch_max_questions,
            single_max_questions: self.upload.single_max_questions,
        }
    }

    /// Get the generation request timeout as a Duration.
    #[must_use]
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation.timeout_secs)
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::ConfigValidation {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.storage.slot_key, DEFAULT_SLOT_KEY);
        assert_eq!(config.storage.identity, CardIdentity::QuestionText);
        assert!(config.generation.endpoint.is_none());
    }

    #[test]
    fn test_default_upload_config() {
        let upload = UploadConfig::default();

        assert_eq!(upload.max_files, 10);
        assert_eq!(upload.max_file_size_mb, 5);
        assert_eq!(upload.max_total_size_mb, 50);
        assert_eq!(upload.batch_max_questions, 10);
        assert_eq!(upload.single_max_questions, 20);
        assert_eq!(upload.default_questions, 3);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_slot_key() {
        let mut config = Config::default();
        config.storage.slot_key = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("slot_key"));
    }

    #[test]
    fn test_validate_zero_max_files() {
        let mut config = Config::default();
        config.upload.max_files = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_files"));
    }

    #[test]
    fn test_validate_file_limit_above_total() {
        let mut config = Config::default();
        config.upload.max_file_size_mb = 100;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_file_size_mb"));
    }

    #[test]
    fn test_validate_default_questions_out_of_range() {
        let mut config = Config::default();
        config.upload.default_questions = 11;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("default_questions"));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.generation.timeout_secs = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("timeout_secs"));
    }

    #[test]
    fn test_validate_bad_endpoint() {
        let mut config = Config::default();
        config.generation.endpoint = Some("not a url".to_string());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("endpoint"));

        config.generation.endpoint = Some("http://localhost:3400/generate".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        assert!(config.database_path().to_string_lossy().contains("cards.db"));
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
    fn test_slot_quota() {
        let mut config = Config::default();
        assert_eq!(config.slot_quota(), Some(5 * 1024 * 1024));

        config.storage.slot_quota_bytes = 0;
        assert!(config.slot_quota().is_none());
    }

    #[test]
    fn test_upload_limits_in_bytes() {
        let limits = Config::default().upload_limits();

        assert_eq!(limits.max_files, 10);
        assert_eq!(limits.max_file_size, 5 * 1024 * 1024);
        assert_eq!(limits.max_total_size, 50 * 1024 * 1024);
        assert_eq!(limits.batch_max_questions, 10);
        assert_eq!(limits.single_max_questions, 20);
    }

    #[test]
    fn test_generation_timeout() {
        let config = Config::default();
        assert_eq!(config.generation_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("studybuddy"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // A missing file falls back to defaults.
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[storage]
identity = "content-hash"

[upload]
max_files = 4
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.storage.identity, CardIdentity::ContentHash);
        assert_eq!(config.upload.max_files, 4);
        assert_eq!(config.upload.max_file_size_mb, 5);
    }

    #[test]
    fn test_load_generation_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[generation]
endpoint = "http://127.0.0.1:3400/generate"
timeout_secs = 30
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(
            config.generation.endpoint.as_deref(),
            Some("http://127.0.0.1:3400/generate")
        );
        assert_eq!(config.generation_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_validate_huge_size_limit() {
        let mut config = Config::default();
        config.upload.max_total_size_mb = u64::MAX;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_total_size_mb"));

        config.upload.max_total_size_mb = MAX_SIZE_MB;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_upload_limits_saturate() {
        let mut config = Config::default();
        config.upload.max_file_size_mb = u64::MAX;
        config.upload.max_total_size_mb = u64::MAX;

        let limits = config.upload_limits();
        assert_eq!(limits.max_file_size, u64::MAX);
        assert_eq!(limits.max_total_size, u64::MAX);
    }

    #[test]
    fn test_storage_config_deserialize() {
        let json = r#"{"slot_key": "custom_cards", "identity": "question-text"}"#;
        let storage: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(storage.slot_key, "custom_cards");
        assert_eq!(storage.slot_quota_bytes, 5 * 1024 * 1024);
    }
}
