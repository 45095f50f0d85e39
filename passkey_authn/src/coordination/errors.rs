//! Error types for the coordination layer

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assertion::AssertionError;
use crate::challenge::ChallengeError;
use crate::credential::CredentialError;
use crate::session::SessionError;
use crate::storage::StorageError;
use crate::utils::UtilError;

/// Errors that can occur while coordinating authentication flows
#[derive(Error, Debug)]
pub enum CoordinationError {
    /// General coordination error
    #[error("Coordination error: {0}")]
    Coordination(String),

    /// Public key that is neither a COSE EC2 key nor an uncompressed P-256 point
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Error from challenge operations
    #[error("Challenge error: {0}")]
    Challenge(ChallengeError),

    /// Error from credential operations
    #[error("Credential error: {0}")]
    Credential(CredentialError),

    /// Error from assertion verification
    #[error("Assertion error: {0}")]
    Assertion(AssertionError),

    /// Error from the session issuer
    #[error("Session error: {0}")]
    Session(SessionError),

    /// Error from the storage layer
    #[error("Storage error: {0}")]
    Storage(StorageError),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(UtilError),
}

/// Stable failure taxonomy exposed on the wire
///
/// Serialized snake_case; these strings are part of the API surface and do
/// not change between releases. `StoreUnavailable` is the only kind callers
/// should treat as an infrastructure (5xx-grade) failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ChallengeNotFound,
    ChallengeExpired,
    ChallengeAlreadyUsed,
    ChallengePurposeOrUserMismatch,
    CredentialNotFound,
    DuplicateCredentialId,
    NotOwner,
    SignatureInvalid,
    CounterNotIncreased,
    MalformedPublicKeyOrSignature,
    /// Generic kind shown to end users when the precise reason must stay hidden
    AuthenticationFailed,
    StoreUnavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChallengeNotFound => "challenge_not_found",
            Self::ChallengeExpired => "challenge_expired",
            Self::ChallengeAlreadyUsed => "challenge_already_used",
            Self::ChallengePurposeOrUserMismatch => "challenge_purpose_or_user_mismatch",
            Self::CredentialNotFound => "credential_not_found",
            Self::DuplicateCredentialId => "duplicate_credential_id",
            Self::NotOwner => "not_owner",
            Self::SignatureInvalid => "signature_invalid",
            Self::CounterNotIncreased => "counter_not_increased",
            Self::MalformedPublicKeyOrSignature => "malformed_public_key_or_signature",
            Self::AuthenticationFailed => "authentication_failed",
            Self::StoreUnavailable => "store_unavailable",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CoordinationError {
    /// Log the error and return self
    ///
    /// Allows method chaining at the raise site when a variant is built
    /// directly rather than converted from a domain error.
    pub fn log(self) -> Self {
        tracing::error!("{}", self);
        self
    }

    /// Classify the error into the stable wire taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Coordination(_) => ErrorKind::AuthenticationFailed,
            Self::InvalidPublicKey(_) => ErrorKind::MalformedPublicKeyOrSignature,
            Self::Challenge(e) => match e {
                ChallengeError::NotFound => ErrorKind::ChallengeNotFound,
                ChallengeError::Expired => ErrorKind::ChallengeExpired,
                ChallengeError::AlreadyUsed => ErrorKind::ChallengeAlreadyUsed,
                ChallengeError::PurposeMismatch | ChallengeError::UserMismatch => {
                    ErrorKind::ChallengePurposeOrUserMismatch
                }
                ChallengeError::Crypto(_) | ChallengeError::Storage(_) => {
                    ErrorKind::StoreUnavailable
                }
            },
            Self::Credential(e) => match e {
                CredentialError::NotFound => ErrorKind::CredentialNotFound,
                CredentialError::Duplicate => ErrorKind::DuplicateCredentialId,
                CredentialError::NotOwner => ErrorKind::NotOwner,
                CredentialError::CounterRegression => ErrorKind::CounterNotIncreased,
                CredentialError::Storage(_) => ErrorKind::StoreUnavailable,
            },
            Self::Assertion(e) => match e {
                AssertionError::CredentialNotFound => ErrorKind::CredentialNotFound,
                // Spent, expired, mismatched and unknown challenges stay
                // indistinguishable to callers
                AssertionError::ChallengeInvalid => ErrorKind::AuthenticationFailed,
                AssertionError::SignatureInvalid => ErrorKind::SignatureInvalid,
                AssertionError::CounterNotIncreased => ErrorKind::CounterNotIncreased,
                AssertionError::UserHandleMismatch => ErrorKind::AuthenticationFailed,
                AssertionError::ClientData(_)
                | AssertionError::AuthenticatorData(_)
                | AssertionError::Format(_) => ErrorKind::MalformedPublicKeyOrSignature,
                AssertionError::Storage(_) => ErrorKind::StoreUnavailable,
            },
            Self::Session(_) | Self::Storage(_) | Self::Utils(_) => ErrorKind::StoreUnavailable,
        }
    }
}

// Custom From implementations that automatically log errors

impl From<ChallengeError> for CoordinationError {
    fn from(err: ChallengeError) -> Self {
        let error = Self::Challenge(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<CredentialError> for CoordinationError {
    fn from(err: CredentialError) -> Self {
        let error = Self::Credential(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<AssertionError> for CoordinationError {
    fn from(err: AssertionError) -> Self {
        let error = Self::Assertion(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<SessionError> for CoordinationError {
    fn from(err: SessionError) -> Self {
        let error = Self::Session(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<StorageError> for CoordinationError {
    fn from(err: StorageError) -> Self {
        let error = Self::Storage(err);
        tracing::error!("{}", error);
        error
    }
}

impl From<UtilError> for CoordinationError {
    fn from(err: UtilError) -> Self {
        let error = Self::Utils(err);
        tracing::error!("{}", error);
        error
    }
}
