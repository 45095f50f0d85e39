//! Authentication coordination module
//!
//! This module provides the high-level entry points that tie the lower
//! layers (challenges, credentials, assertion verification, session
//! issuance) into complete ceremonies.
//!
//! The module is divided into several submodules:
//! - `authentication`: begin/complete of the authentication ceremony
//! - `credentials`: credential listing and revocation on behalf of a user
//! - `errors`: error types and the stable wire taxonomy
//! - `registration`: begin/complete of the registration ceremony
//! - `types`: request and response types for the ceremonies

mod authentication;
mod credentials;
mod errors;
mod registration;
mod types;

pub use authentication::{begin_authentication, complete_authentication};
pub use credentials::{list_user_credentials, revoke_user_credential};
pub use errors::{CoordinationError, ErrorKind};
pub use registration::{begin_registration, complete_registration};
pub use types::{
    AuthenticationChallenge, AuthenticationRequest, AuthenticationResponse, CredentialSummary,
    RegistrationChallenge, RegistrationRequest, RegistrationResponse,
};
