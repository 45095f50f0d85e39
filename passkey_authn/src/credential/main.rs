use chrono::{DateTime, Utc};

use crate::credential::errors::CredentialError;
use crate::credential::storage::CredentialStore;
use crate::credential::types::{Credential, CredentialMetadata};

/// Stores a new credential for a user
///
/// The credential id must be globally unique: a collision with any existing
/// credential, for this user or another one, fails with `Duplicate` and
/// leaves the stored row untouched. The signature counter starts at whatever
/// the registration ceremony reported, 0 for authenticators without one.
pub async fn register_credential(
    user_id: &str,
    credential_id: &str,
    public_key: &str,
    metadata: CredentialMetadata,
) -> Result<Credential, CredentialError> {
    let now = Utc::now();
    let credential = Credential {
        credential_id: credential_id.to_string(),
        user_id: user_id.to_string(),
        public_key: public_key.to_string(),
        counter: metadata.initial_counter,
        aaguid: metadata.aaguid,
        user_verified: metadata.user_verified,
        backed_up: metadata.backed_up,
        device_label: metadata.device_label,
        created_at: now,
        last_used_at: now,
    };

    CredentialStore::insert_credential(&credential).await?;

    tracing::info!(
        "Registered credential {} for user {}",
        credential.credential_id,
        credential.user_id
    );

    Ok(credential)
}

pub async fn find_credential_by_id(
    credential_id: &str,
) -> Result<Option<Credential>, CredentialError> {
    CredentialStore::get_credential_by_id(credential_id).await
}

pub async fn list_credentials_for_user(user_id: &str) -> Result<Vec<Credential>, CredentialError> {
    CredentialStore::get_credentials_by_user(user_id).await
}

/// Advances the signature counter and last-used timestamp after a verified
/// assertion
///
/// The update is conditional in the store: it only matches when the stored
/// counter is zero or below `new_counter`, so two concurrent assertions over
/// the same credential produce exactly one winner. The loser, and any caller
/// whose counter failed to move forward, gets `CounterRegression`.
pub async fn record_successful_use(
    credential_id: &str,
    new_counter: u32,
    used_at: DateTime<Utc>,
) -> Result<(), CredentialError> {
    let updated = CredentialStore::record_successful_use(credential_id, new_counter, used_at).await?;
    if updated {
        tracing::debug!(
            "Credential {} counter advanced to {}",
            credential_id,
            new_counter
        );
        return Ok(());
    }

    // Nothing matched: either the row is gone or the counter guard refused
    // the write.
    match CredentialStore::get_credential_by_id(credential_id).await? {
        None => Err(CredentialError::NotFound),
        Some(stored) => {
            tracing::warn!(
                "Counter for credential {} did not advance ({} -> {})",
                credential_id,
                stored.counter,
                new_counter
            );
            Err(CredentialError::CounterRegression)
        }
    }
}

/// Removes a credential, but only on behalf of its owner
pub async fn revoke_credential(credential_id: &str, user_id: &str) -> Result<(), CredentialError> {
    let deleted = CredentialStore::delete_credential_for_user(credential_id, user_id).await?;
    if deleted {
        tracing::info!("Revoked credential {} for user {}", credential_id, user_id);
        return Ok(());
    }

    match CredentialStore::get_credential_by_id(credential_id).await? {
        None => Err(CredentialError::NotFound),
        Some(_) => Err(CredentialError::NotOwner),
    }
}
