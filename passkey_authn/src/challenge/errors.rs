use thiserror::Error;

use crate::utils::UtilError;

/// Outcomes of challenge consumption plus the infrastructure failures the
/// store can raise. The precise kinds stay internal to the crate; callers
/// outside the coordination layer see them collapsed into a generic failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChallengeError {
    #[error("Challenge not found")]
    NotFound,

    #[error("Challenge has expired")]
    Expired,

    #[error("Challenge has already been used")]
    AlreadyUsed,

    #[error("Challenge purpose mismatch")]
    PurposeMismatch,

    #[error("Challenge user binding mismatch")]
    UserMismatch,

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<UtilError> for ChallengeError {
    fn from(err: UtilError) -> Self {
        ChallengeError::Crypto(err.to_string())
    }
}
