use thiserror::Error;

/// Errors that can occur while verifying a signed assertion.
///
/// Every challenge-consumption failure is collapsed into the single
/// `ChallengeInvalid` variant: a caller probing with guessed challenge values
/// must not learn which sub-check rejected them. The precise reason is logged
/// internally instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssertionError {
    #[error("Credential not found")]
    CredentialNotFound,

    #[error("Invalid challenge")]
    ChallengeInvalid,

    /// Error during cryptographic verification of the assertion signature
    #[error("Signature verification failed")]
    SignatureInvalid,

    /// The authenticator-reported counter did not exceed the stored one.
    /// Possible credential cloning; kept distinct so policy can react.
    #[error("Signature counter did not increase")]
    CounterNotIncreased,

    #[error("User handle mismatch")]
    UserHandleMismatch,

    /// Error validating the client data JSON from the browser
    #[error("Invalid client data: {0}")]
    ClientData(String),

    /// Error parsing or validating the authenticator data structure
    #[error("Invalid authenticator data: {0}")]
    AuthenticatorData(String),

    /// Error with improperly formatted data
    #[error("Invalid format: {0}")]
    Format(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
