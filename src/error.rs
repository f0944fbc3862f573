//! Application error types with caller-facing classification.

use thiserror::Error;

/// Application-level errors for Kindred.
#[derive(Error, Debug)]
pub enum AppError {
    // Domain errors
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("category not found: {0}")]
    CategoryNotFound(String),

    #[error("cannot merge entity with itself")]
    SelfMerge,

    #[error("validation error: {0}")]
    Validation(String),

    /// A merge transaction failed and was rolled back. The underlying
    /// database error is logged, not surfaced to the caller.
    #[error("merge transaction failed: {0}")]
    Transaction(String),

    // Database errors
    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("connection pool error: {0}")]
    Pool(String),

    #[error("internal error: {0}")]
    Internal(String),

    // Config errors
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Coarse classification of an error for the caller-facing surface.
///
/// Maps the error taxonomy onto the signal classes a transport layer
/// would use: invalid input, missing resource, invalid operation, or
/// internal failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-range input. Nothing was mutated.
    Validation,
    /// A referenced id does not resolve to an existing record.
    NotFound,
    /// Both ids are individually valid but the operation is not (self-merge).
    InvalidOperation,
    /// Internal failure; any in-flight transaction was rolled back.
    Internal,
}

impl ErrorKind {
    /// True for errors the caller can fix by changing the request.
    pub fn is_client_error(self) -> bool {
        !matches!(self, ErrorKind::Internal)
    }
}

impl AppError {
    /// Classify this error and give it a stable application code.
    pub fn kind(&self) -> (ErrorKind, &'static str) {
        match self {
            AppError::EntityNotFound(_) => (ErrorKind::NotFound, "ENTITY_NOT_FOUND"),
            AppError::CategoryNotFound(_) => (ErrorKind::NotFound, "CATEGORY_NOT_FOUND"),
            AppError::SelfMerge => (ErrorKind::InvalidOperation, "SELF_MERGE"),
            AppError::Validation(_) => (ErrorKind::Validation, "VALIDATION_ERROR"),
            AppError::Transaction(_) => (ErrorKind::Internal, "TRANSACTION_FAILED"),
            AppError::Database(_) => (ErrorKind::Internal, "DATABASE_ERROR"),
            AppError::Pool(_) => (ErrorKind::Internal, "POOL_ERROR"),
            AppError::Internal(_) => (ErrorKind::Internal, "INTERNAL_ERROR"),
            AppError::Config(_) => (ErrorKind::Internal, "CONFIG_ERROR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_classified() {
        assert!(AppError::Validation("bad".into()).kind().0.is_client_error());
        assert!(AppError::EntityNotFound("x".into()).kind().0.is_client_error());
        assert!(AppError::SelfMerge.kind().0.is_client_error());
    }

    #[test]
    fn test_self_merge_distinct_from_not_found() {
        let (kind, code) = AppError::SelfMerge.kind();
        assert_eq!(kind, ErrorKind::InvalidOperation);
        assert_eq!(code, "SELF_MERGE");
        assert_ne!(kind, AppError::EntityNotFound("x".into()).kind().0);
    }

    #[test]
    fn test_transaction_failure_is_internal() {
        let (kind, _) = AppError::Transaction("merge transaction failed".into()).kind();
        assert_eq!(kind, ErrorKind::Internal);
        assert!(!kind.is_client_error());
    }
}
