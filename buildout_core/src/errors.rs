//! # Error Types
//!
//! Structured error types for buildout_core. The engine itself prefers
//! documented fallbacks (unknown location, missing slider value, floor count
//! past the table) over errors, so most variants here come from input
//! validation, configuration loading and file handling.
//!
//! ## Example
//!
//! ```rust
//! use buildout_core::errors::{CostError, CostResult};
//!
//! fn validate_size(project_size: f64) -> CostResult<()> {
//!     if project_size <= 0.0 {
//!         return Err(CostError::InvalidInput {
//!             field: "projectSize".to_string(),
//!             value: project_size.to_string(),
//!             reason: "Project size must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for buildout_core operations
pub type CostResult<T> = Result<T, CostError>;

/// Structured error type for estimation operations.
///
/// Each variant carries enough context to be rendered for a person or
/// handled programmatically via [`CostError::error_code`].
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CostError {
    /// An input value is invalid (out of range, not finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A configuration table is malformed
    #[error("Invalid configuration in '{table}': {reason}")]
    InvalidConfig { table: String, reason: String },

    /// No saved estimate matches the given id or name
    #[error("Estimate not found: {key}")]
    EstimateNotFound { key: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// A share token could not be decoded
    #[error("Invalid share token: {reason}")]
    InvalidShareToken { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CostError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CostError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(table: impl Into<String>, reason: impl Into<String>) -> Self {
        CostError::InvalidConfig {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Create an EstimateNotFound error
    pub fn estimate_not_found(key: impl Into<String>) -> Self {
        CostError::EstimateNotFound { key: key.into() }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CostError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CostError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError from any displayable error
    pub fn serialization(reason: impl std::fmt::Display) -> Self {
        CostError::SerializationError {
            reason: reason.to_string(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CostError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CostError::InvalidInput { .. } => "INVALID_INPUT",
            CostError::InvalidConfig { .. } => "INVALID_CONFIG",
            CostError::EstimateNotFound { .. } => "ESTIMATE_NOT_FOUND",
            CostError::FileError { .. } => "FILE_ERROR",
            CostError::FileLocked { .. } => "FILE_LOCKED",
            CostError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CostError::InvalidShareToken { .. } => "INVALID_SHARE_TOKEN",
            CostError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CostError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CostError::invalid_input("projectSize", "0", "Project size must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: CostError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CostError::estimate_not_found("Option B").error_code(), "ESTIMATE_NOT_FOUND");
        assert_eq!(CostError::invalid_config("sizeRanges", "empty").error_code(), "INVALID_CONFIG");
        assert_eq!(
            CostError::InvalidShareToken { reason: "bad".into() }.error_code(),
            "INVALID_SHARE_TOKEN"
        );
    }

    #[test]
    fn test_only_lock_errors_are_recoverable() {
        assert!(CostError::file_locked("a.bce", "someone", "now").is_recoverable());
        assert!(!CostError::serialization("eof").is_recoverable());
    }
}
