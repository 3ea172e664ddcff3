//! Pure functions for mapping repository errors to HTTP-facing shapes.
//!
//! The repository layer never formats responses; an outer HTTP layer uses
//! these mappings to build `{code, reason, message}` bodies.

use serde::Serialize;

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `SchemaMismatch` -> 500 (Internal Server Error)
/// - `AlreadyExists` -> 409 (Conflict)
/// - `ConnectionFailed` -> 503 (Service Unavailable)
/// - `QueryFailed`, `TransactionFailed`, `RollbackFailed`, `Serialization` -> 500
/// - `InvalidData` -> 400 (Bad Request)
///
/// # Examples
///
/// ```
/// use keystone_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::ConnectionFailed("refused".to_string());
/// assert_eq!(repository_error_to_status_code(&error), 503);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::SchemaMismatch { .. } => 500,
        RepositoryError::AlreadyExists(_) => 409,
        RepositoryError::ConnectionFailed(_) => 503,
        RepositoryError::QueryFailed(_) => 500,
        RepositoryError::TransactionFailed(_) => 500,
        RepositoryError::RollbackFailed { .. } => 500,
        RepositoryError::Serialization(_) => 500,
        RepositoryError::InvalidData(_) => 400,
    }
}

/// Maps a [`RepositoryError`] to its machine-readable reason tag.
pub fn repository_error_reason(error: &RepositoryError) -> &'static str {
    match error {
        RepositoryError::SchemaMismatch { .. } => "INVALID_DATABASE_SCHEMA_ERROR",
        RepositoryError::AlreadyExists(_) => "CONFLICT",
        RepositoryError::ConnectionFailed(_) => "SERVICE_UNAVAILABLE",
        RepositoryError::InvalidData(_) => "BAD_REQUEST",
        RepositoryError::QueryFailed(_)
        | RepositoryError::TransactionFailed(_)
        | RepositoryError::RollbackFailed { .. }
        | RepositoryError::Serialization(_) => "INTERNAL_SERVER_ERROR",
    }
}

/// Structured error shape handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub reason: String,
    pub message: String,
}

impl From<&RepositoryError> for ErrorBody {
    fn from(error: &RepositoryError) -> Self {
        Self {
            code: repository_error_to_status_code(error),
            reason: repository_error_reason(error).to_string(),
            message: error.to_string(),
        }
    }
}

impl From<&crate::specification::SortParamsError> for ErrorBody {
    fn from(error: &crate::specification::SortParamsError) -> Self {
        Self {
            code: 400,
            reason: "INVALID_SORT_PARAMS".to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::SortParamsError;

    #[test]
    fn test_schema_mismatch_maps_to_500() {
        let error = RepositoryError::SchemaMismatch {
            table: "users".to_string(),
            column: "email".to_string(),
            expected: "TEXT".to_string(),
            found: "INTEGER".to_string(),
        };
        assert_eq!(repository_error_to_status_code(&error), 500);
        assert_eq!(
            repository_error_reason(&error),
            "INVALID_DATABASE_SCHEMA_ERROR"
        );
    }

    #[test]
    fn test_already_exists_maps_to_409() {
        let error = RepositoryError::AlreadyExists("users".to_string());
        assert_eq!(repository_error_to_status_code(&error), 409);
    }

    #[test]
    fn test_connection_failed_maps_to_503() {
        let error = RepositoryError::ConnectionFailed("refused".to_string());
        assert_eq!(repository_error_to_status_code(&error), 503);
    }

    #[test]
    fn test_invalid_data_maps_to_400() {
        let error = RepositoryError::InvalidData("bad".to_string());
        assert_eq!(repository_error_to_status_code(&error), 400);
        assert_eq!(repository_error_reason(&error), "BAD_REQUEST");
    }

    #[test]
    fn test_unrecognized_failures_default_to_internal_server_error() {
        for error in [
            RepositoryError::QueryFailed("x".to_string()),
            RepositoryError::TransactionFailed("x".to_string()),
            RepositoryError::Serialization("x".to_string()),
        ] {
            assert_eq!(repository_error_to_status_code(&error), 500);
            assert_eq!(repository_error_reason(&error), "INTERNAL_SERVER_ERROR");
        }
    }

    #[test]
    fn test_error_body_from_repository_error() {
        let error = RepositoryError::QueryFailed("syntax error".to_string());
        let body = ErrorBody::from(&error);

        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"code":500,"reason":"INTERNAL_SERVER_ERROR","message":"Query failed: syntax error"}"#
        );
    }

    #[test]
    fn test_error_body_from_sort_error() {
        let error = SortParamsError::InvalidSortParams {
            column: "password".to_string(),
        };
        let body = ErrorBody::from(&error);

        assert_eq!(body.code, 400);
        assert_eq!(body.reason, "INVALID_SORT_PARAMS");
    }
}
