//! Storage error types.

use pricetrack_core::CoreError;
use thiserror::Error;

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Column tag string is not one of the known tags.
    #[error("unrecognized column tag {received:?}; expected one of: {expected}")]
    InvalidColumnTag {
        /// Tag that was supplied.
        received: String,
        /// Comma-separated list of valid tags.
        expected: String,
    },

    /// Caller input rejected before touching the database.
    #[error("validation error: {0}")]
    Validation(String),

    /// Could not reach or talk to the database.
    #[error("database connectivity error: {0}")]
    Connectivity(String),

    /// Constraint violation or missing row/column.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(String),

    /// Result column has a type that cannot be decoded.
    #[error("unsupported type {type_name} in column {column}")]
    UnsupportedColumnType {
        /// Column name.
        column: String,
        /// Postgres type name.
        type_name: String,
    },

    /// Configuration or normalization error.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StorageError {
    /// Creates a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Returns true for errors caused by caller input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        match self {
            Self::InvalidColumnTag { .. } | Self::Validation(_) => true,
            Self::Core(err) => err.is_validation(),
            _ => false,
        }
    }

    /// Returns true for connection and IO failures.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }

    /// Returns true for constraint violations and missing rows/columns.
    #[must_use]
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity(_))
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Connectivity(err.to_string()),
            sqlx::Error::RowNotFound | sqlx::Error::ColumnNotFound(_) => {
                Self::Integrity(err.to_string())
            }
            sqlx::Error::Database(db_err) => {
                let integrity = db_err.code().is_some_and(|code| code.starts_with("23"));
                if integrity {
                    Self::Integrity(err.to_string())
                } else {
                    Self::Database(err.to_string())
                }
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
