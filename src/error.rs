//! Custom error types for Keystash
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use std::time::Duration;

use thiserror::Error;

/// The main error type for Keystash operations
#[derive(Error, Debug)]
pub enum KeystashError {
    /// Bad or missing layout/strategy parameters
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backing store could not be reached
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// A storage call did not finish within its deadline
    #[error("Operation timed out after {after:?}: {operation}")]
    Timeout {
        operation: String,
        after: Duration,
    },

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Some backups in a batch could not be processed
    #[error("{failed} of {total} backup(s) failed")]
    PartialFailure { failed: usize, total: usize },

    /// Backing store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

impl KeystashError {
    /// Create a "not found" error for a backup record
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        }
    }

    /// Create a timeout error for the named operation
    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            after,
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<std::io::Error> for KeystashError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for KeystashError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Keystash operations
pub type KeystashResult<T> = Result<T, KeystashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = KeystashError::Config("custom prefix is required".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: custom prefix is required"
        );
        assert!(err.is_config());
    }

    #[test]
    fn test_not_found_error() {
        let err = KeystashError::backup_not_found("daily");
        assert_eq!(err.to_string(), "Backup not found: daily");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_timeout_error() {
        let err = KeystashError::timeout("get_backup", Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Operation timed out after 1.5s: get_backup");
        assert!(err.is_timeout());
    }

    #[test]
    fn test_partial_failure_error() {
        let err = KeystashError::PartialFailure {
            failed: 1,
            total: 3,
        };
        assert_eq!(err.to_string(), "1 of 3 backup(s) failed");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: KeystashError = io_err.into();
        assert!(matches!(err, KeystashError::Io(_)));
    }
}
