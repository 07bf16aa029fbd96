//! Error types for funnelcraft-canvas
//!
//! This module provides error types for the canvas engine,
//! covering persistence, serialization and configuration errors.

use thiserror::Error;

use crate::element::StepId;

/// Canvas error type
#[derive(Debug, Error)]
pub enum Error {
    /// No step is currently loaded
    #[error("no step loaded")]
    StepNotLoaded,

    /// Storage backend rejected a get/set
    #[error("storage error for step {step_id}: {message}")]
    Storage {
        /// Step the call was scoped to
        step_id: StepId,
        /// Backend message
        message: String,
    },

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a storage error
    #[must_use]
    pub fn storage(step_id: &StepId, msg: impl Into<String>) -> Self {
        Self::Storage {
            step_id: step_id.clone(),
            message: msg.into(),
        }
    }

    /// Create a database error
    #[must_use]
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create an invalid configuration error
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Check if error is recoverable by retrying
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Database(_))
    }

    /// Get a stable error code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::StepNotLoaded => "step_not_loaded",
            Self::Storage { .. } => "storage_error",
            Self::Database(_) => "database_error",
            Self::Serialization(_) => "serialization_error",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Result type alias for canvas operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::StepNotLoaded.code(), "step_not_loaded");
        assert_eq!(
            Error::storage(&StepId::from("s1"), "timeout").code(),
            "storage_error"
        );
        assert_eq!(Error::database("locked").code(), "database_error");
        assert_eq!(Error::invalid_config("x").code(), "invalid_config");
    }

    #[test]
    fn test_error_is_recoverable() {
        assert!(Error::storage(&StepId::from("s1"), "timeout").is_recoverable());
        assert!(Error::database("locked").is_recoverable());
        assert!(!Error::invalid_config("history_limit").is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = Error::storage(&StepId::from("checkout"), "connection reset");
        let msg = err.to_string();
        assert!(msg.contains("checkout"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_from_serde_error() {
        let result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        let err: Error = result.unwrap_err().into();
        assert_eq!(err.code(), "serialization_error");
    }
}
