//! Unified application error types for Tablekit.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A filter, order, or data field does not exist on the target table.
    UnknownColumn,
    /// An unregistered lookup operator name was used.
    UnknownLookup,
    /// A filter or data value has the wrong shape or runtime type.
    InvalidValue,
    /// A null value was bound to a non-nullable column.
    NullViolation,
    /// A non-positive limit or negative offset was requested.
    InvalidPagination,
    /// Input validation failed.
    Validation,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownColumn => write!(f, "UNKNOWN_COLUMN"),
            Self::UnknownLookup => write!(f, "UNKNOWN_LOOKUP"),
            Self::InvalidValue => write!(f, "INVALID_VALUE"),
            Self::NullViolation => write!(f, "NULL_VIOLATION"),
            Self::InvalidPagination => write!(f, "INVALID_PAGINATION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Tablekit.
///
/// Validation-class errors (unknown column, bad value shape, pagination
/// bounds, ...) are raised before any statement reaches the store and are
/// never retried. Store-level errors keep their original sqlx cause in
/// `source` for diagnostics; retry decisions belong to the caller.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an unknown-column error.
    pub fn unknown_column(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownColumn, message)
    }

    /// Create an unknown-lookup error.
    pub fn unknown_lookup(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownLookup, message)
    }

    /// Create an invalid-value error (wrong shape or runtime type).
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidValue, message)
    }

    /// Create a nullability-violation error.
    pub fn null_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NullViolation, message)
    }

    /// Create an invalid-pagination error.
    pub fn invalid_pagination(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidPagination, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = AppError::unknown_column("column 'nope' does not exist on table 'users'");
        assert_eq!(
            err.to_string(),
            "UNKNOWN_COLUMN: column 'nope' does not exist on table 'users'"
        );
    }

    #[test]
    fn test_source_is_preserved() {
        let io = std::io::Error::other("boom");
        let err = AppError::with_source(ErrorKind::Database, "query failed", io);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::other("boom");
        let err = AppError::with_source(ErrorKind::Database, "query failed", io);
        let cloned = err.clone();
        assert_eq!(cloned.kind, ErrorKind::Database);
        assert!(cloned.source.is_none());
    }
}
