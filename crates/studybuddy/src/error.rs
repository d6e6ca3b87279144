//! Error types for studybuddy.
//!
//! This module defines all error types used throughout the studybuddy crate.
//! Most of them never reach the user as a fault: the card store and the
//! upload orchestrator recover them at their boundary and turn them into
//! notifications.

use std::path::PathBuf;
use thiserror::Error;

use crate::upload::ValidationErrors;

/// The main error type for studybuddy operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A value did not fit in the durable slot.
    #[error("slot quota exceeded: {size} bytes written, {quota} allowed")]
    QuotaExceeded {
        /// Size of the rejected value in bytes.
        size: usize,
        /// Configured quota in bytes.
        quota: usize,
    },

    // === Card Store Errors ===
    /// The persisted card collection could not be parsed.
    #[error("saved cards in slot '{key}' are corrupt: {message}")]
    LoadCorruption {
        /// Slot key that was read.
        key: String,
        /// Description of what went wrong.
        message: String,
    },

    /// The card collection could not be written to the durable slot.
    #[error("failed to persist saved cards to slot '{key}': {message}")]
    Persistence {
        /// Slot key that was written.
        key: String,
        /// Description of what went wrong.
        message: String,
    },

    /// A mutation was attempted before the store finished loading.
    #[error("card store has not been initialized")]
    StoreNotLoaded,

    // === Upload Errors ===
    /// The upload batch failed validation.
    #[error("invalid upload: {0}")]
    Validation(ValidationErrors),

    /// A file could not be turned into a study material payload.
    #[error("failed to encode '{name}': {message}")]
    Encoding {
        /// Name of the file.
        name: String,
        /// Description of what went wrong.
        message: String,
    },

    /// The generation service failed for one request.
    #[error("generation failed: {message}")]
    Generation {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for studybuddy operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Generation {
            message: err.to_string(),
        }
    }
}

impl Error {
    /// Create a new generation error.
    #[must_use]
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Create a new encoding error for the named file.
    #[must_use]
    pub fn encoding(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encoding {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means the store was used before loading.
    #[must_use]
    pub fn is_not_loaded(&self) -> bool {
        matches!(self, Self::StoreNotLoaded)
    }

    /// Check if this error is a durable slot quota rejection.
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }

    /// Check if this error is an upload validation failure.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::{FieldError, UploadField};

    #[test]
    fn test_error_display() {
        let err = Error::StoreNotLoaded;
        assert_eq!(err.to_string(), "card store has not been initialized");

        let err = Error::generation("timeout");
        assert_eq!(err.to_string(), "generation failed: timeout");
    }

    #[test]
    fn test_error_is_not_loaded() {
        assert!(Error::StoreNotLoaded.is_not_loaded());
        assert!(!Error::generation("x").is_not_loaded());
    }

    #[test]
    fn test_quota_exceeded_display() {
        let err = Error::QuotaExceeded {
            size: 2048,
            quota: 1024,
        };
        assert!(err.is_quota_exceeded());
        let msg = err.to_string();
        assert!(msg.contains("2048"));
        assert!(msg.contains("1024"));
    }

    #[test]
    fn test_load_corruption_display() {
        let err = Error::LoadCorruption {
            key: "studybuddyai_saved_cards".to_string(),
            message: "expected value at line 1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("studybuddyai_saved_cards"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn test_persistence_display() {
        let err = Error::Persistence {
            key: "cards".to_string(),
            message: "disk full".to_string(),
        };
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_encoding_error() {
        let err = Error::encoding("notes.pdf", "missing media type");
        let msg = err.to_string();
        assert!(msg.contains("notes.pdf"));
        assert!(msg.contains("missing media type"));
    }

    #[test]
    fn test_validation_error() {
        let errors = ValidationErrors::from(vec![FieldError::new(
            UploadField::Files,
            "Please select at least one file.",
        )]);
        let err = Error::Validation(errors);
        assert!(err.is_validation_error());
        assert!(err.to_string().contains("at least one file"));
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "max_files must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("max_files"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
