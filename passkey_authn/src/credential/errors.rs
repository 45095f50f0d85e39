use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Credential not found")]
    NotFound,

    /// The credential id is already registered, possibly to another user.
    /// Registration must reject it rather than overwrite the existing row.
    #[error("Credential ID is already registered")]
    Duplicate,

    #[error("Credential belongs to another user")]
    NotOwner,

    /// The conditional counter update matched no row: the submitted counter
    /// did not exceed the stored one, or a concurrent update got there first.
    #[error("Signature counter did not increase")]
    CounterRegression,

    #[error("Storage error: {0}")]
    Storage(String),
}
