//! passkey_authn - Passkey authentication core
//!
//! This crate verifies WebAuthn-style assertions against stored credentials
//! and coordinates the surrounding ceremonies: single-use challenge issuance
//! and consumption, credential registration and lifecycle, authenticator
//! display metadata and assurance-level evaluation, with session issuance
//! delegated to the embedding application.

mod assertion;
mod assurance;
mod authenticator;
mod challenge;
mod config;
mod coordination;
mod credential;
mod session;
mod storage;
#[cfg(test)]
mod test_utils;
mod utils;

// Re-export the main coordination components
pub use coordination::{
    CoordinationError, ErrorKind, begin_authentication, begin_registration,
    complete_authentication, complete_registration, list_user_credentials,
    revoke_user_credential,
};

pub use coordination::{
    AuthenticationChallenge, AuthenticationRequest, AuthenticationResponse, CredentialSummary,
    RegistrationChallenge, RegistrationRequest, RegistrationResponse,
};

pub use assertion::{AssertionError, AssertionResponse, VerifiedAssertion, verify_assertion};

pub use assurance::{AssuranceLevel, AssurancePolicy, MethodTag};

pub use authenticator::{AuthenticatorCatalog, AuthenticatorInfo, VendorCategory};

pub use challenge::{
    Challenge, ChallengeError, ChallengePurpose, consume_challenge, issue_challenge,
    start_challenge_sweeper, sweep_expired_challenges,
};

pub use credential::{
    Credential, CredentialError, CredentialMetadata, find_credential_by_id,
    list_credentials_for_user, record_successful_use, register_credential, revoke_credential,
};

pub use session::{IssuedTokens, SessionError, SessionIssuer};

/// Initialize the authentication core
///
/// Connects the data store and creates the challenge and credential tables
/// if they do not exist. Call once at startup before any other operation.
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize the underlying stores
    storage::init().await?;
    challenge::init().await?;
    credential::init().await?;
    Ok(())
}
