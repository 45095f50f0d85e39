mod errors;
mod main;
mod storage;
mod types;

pub use errors::CredentialError;
pub use main::{
    find_credential_by_id, list_credentials_for_user, record_successful_use, register_credential,
    revoke_credential,
};
pub use types::{Credential, CredentialMetadata};

pub(crate) async fn init() -> Result<(), CredentialError> {
    storage::CredentialStore::init().await
}
