use crate::authenticator::AuthenticatorCatalog;
use crate::credential::{list_credentials_for_user, revoke_credential};

use super::errors::CoordinationError;
use super::types::CredentialSummary;

/// Lists a user's credentials decorated with catalog display metadata
///
/// An unknown or missing AAGUID resolves to the generic catalog entry, so
/// every summary carries a usable display name.
pub async fn list_user_credentials(
    user_id: &str,
    catalog: &AuthenticatorCatalog,
) -> Result<Vec<CredentialSummary>, CoordinationError> {
    let credentials = list_credentials_for_user(user_id).await?;

    Ok(credentials
        .into_iter()
        .map(|credential| {
            let info = catalog.lookup(credential.aaguid.as_deref());
            CredentialSummary {
                credential_id: credential.credential_id,
                device_label: credential.device_label,
                authenticator_name: info.name,
                icon_id: info.icon_id,
                vendor_category: info.vendor_category,
                counter: credential.counter,
                user_verified: credential.user_verified,
                backed_up: credential.backed_up,
                created_at: credential.created_at,
                last_used_at: credential.last_used_at,
            }
        })
        .collect())
}

/// Revokes one of the user's credentials
///
/// Refuses to touch a credential owned by someone else; the returned error
/// distinguishes that case from a credential that does not exist.
pub async fn revoke_user_credential(
    user_id: &str,
    credential_id: &str,
) -> Result<(), CoordinationError> {
    revoke_credential(credential_id, user_id).await?;
    Ok(())
}
