use thiserror::Error;

/// Errors raised by the storage layer itself, before any domain-level
/// interpretation. Domain stores wrap these into their own error types.
#[derive(Debug, Error, Clone)]
pub enum StorageError {
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Storage(err.to_string())
    }
}
