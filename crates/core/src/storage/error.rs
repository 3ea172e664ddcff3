use thiserror::Error;

/// Errors that can occur during repository operations.
///
/// Absence of a matching row is never an error: `get` yields `None`,
/// `exist` yields `false` and `list` yields an empty vector.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Mismatch or missing column: {column}, Expected: {expected}, Found: {found}")]
    SchemaMismatch {
        table: String,
        column: String,
        expected: String,
        found: String,
    },
    #[error("Conflicting row in {0}")]
    AlreadyExists(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
    /// Rollback failed after the transaction body failed. The rollback
    /// failure is what gets reported; `cause` keeps the body's error.
    #[error("Rollback failed: {rollback}")]
    RollbackFailed {
        rollback: String,
        cause: Box<RepositoryError>,
    },
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
