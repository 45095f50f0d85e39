use chrono::Utc;
use ring::{digest, signature::UnparsedPublicKey};

use crate::assertion::errors::AssertionError;
use crate::assertion::types::{
    AssertionResponse, AuthenticatorData, ParsedClientData, VerifiedAssertion,
};
use crate::challenge::{ChallengeError, ChallengePurpose, consume_challenge};
use crate::credential::{
    Credential, CredentialError, find_credential_by_id, record_successful_use,
};
use crate::utils::base64url_decode;

/// Verifies a signed assertion end to end
///
/// The order of operations is part of the contract:
/// 1. Look up the credential.
/// 2. Consume the challenge embedded in the client data. From here on the
///    challenge is burned even if a later step fails, so one challenge never
///    absorbs more than a single signature attempt.
/// 3. Validate client data (origin, ceremony type) and authenticator data
///    (RP ID hash, user presence, user verification policy).
/// 4. Verify the signature over `authenticator_data || SHA-256(client_data)`.
/// 5. Enforce the monotonic signature counter; a counter that fails to
///    advance is reported as `CounterNotIncreased`, distinct from signature
///    failures, since it indicates possible credential cloning.
/// 6. Only then record the successful use (counter + last-used timestamp).
///
/// A failed verification performs no mutation besides the challenge burn.
pub async fn verify_assertion(
    response: &AssertionResponse,
) -> Result<VerifiedAssertion, AssertionError> {
    let stored_credential = match find_credential_by_id(&response.credential_id).await {
        Ok(Some(credential)) => credential,
        Ok(None) => {
            tracing::warn!(
                "Assertion for unknown credential {}",
                response.credential_id
            );
            return Err(AssertionError::CredentialNotFound);
        }
        Err(e) => return Err(AssertionError::Storage(e.to_string())),
    };

    let client_data = ParsedClientData::from_base64(&response.client_data_json)?;

    // Single-use barrier: whatever happens after this point, the challenge
    // is spent. The detailed reason stays in the logs; callers only see
    // ChallengeInvalid.
    if let Err(e) = consume_challenge(
        &client_data.challenge,
        ChallengePurpose::Authentication,
        Some(&stored_credential.user_id),
    )
    .await
    {
        return Err(match e {
            ChallengeError::Storage(msg) => AssertionError::Storage(msg),
            other => {
                tracing::warn!(
                    "Challenge consumption failed for credential {}: {}",
                    response.credential_id,
                    other
                );
                AssertionError::ChallengeInvalid
            }
        });
    }

    client_data.verify()?;

    let auth_data = AuthenticatorData::from_base64(&response.authenticator_data)?;
    auth_data.verify()?;

    verify_user_handle(
        response.user_handle.as_deref(),
        &stored_credential,
        auth_data.is_discoverable(),
    )?;

    verify_signature(&stored_credential, &client_data, &auth_data, &response.signature)?;

    let new_counter = auth_data.counter;
    if stored_credential.counter > 0 && new_counter <= stored_credential.counter {
        tracing::warn!(
            "Possible credential cloning: counter for {} went {} -> {}",
            response.credential_id,
            stored_credential.counter,
            new_counter
        );
        return Err(AssertionError::CounterNotIncreased);
    }

    match record_successful_use(&response.credential_id, new_counter, Utc::now()).await {
        Ok(()) => {}
        // A concurrent assertion advanced the counter after our check
        Err(CredentialError::CounterRegression) => {
            return Err(AssertionError::CounterNotIncreased);
        }
        Err(CredentialError::NotFound) => return Err(AssertionError::CredentialNotFound),
        Err(e) => return Err(AssertionError::Storage(e.to_string())),
    }

    tracing::info!(
        "Verified assertion for credential {} (user {})",
        stored_credential.credential_id,
        stored_credential.user_id
    );

    Ok(VerifiedAssertion {
        user_id: stored_credential.user_id,
        credential_id: stored_credential.credential_id,
        counter: new_counter,
    })
}

/// Verifies that the user handle in the assertion matches the stored owner
///
/// Discoverable credentials must provide a user handle; for others it is
/// optional but has to match when present.
fn verify_user_handle(
    user_handle: Option<&str>,
    stored_credential: &Credential,
    is_discoverable: bool,
) -> Result<(), AssertionError> {
    match (user_handle, is_discoverable) {
        (Some(handle), _) if handle != stored_credential.user_id => {
            tracing::warn!(
                "User handle mismatch for credential {}",
                stored_credential.credential_id
            );
            Err(AssertionError::UserHandleMismatch)
        }
        (None, true) => {
            // Discoverable credentials MUST provide a user handle
            Err(AssertionError::UserHandleMismatch)
        }
        _ => Ok(()),
    }
}

fn verify_signature(
    stored_credential: &Credential,
    client_data: &ParsedClientData,
    auth_data: &AuthenticatorData,
    signature: &str,
) -> Result<(), AssertionError> {
    let verification_algorithm = &ring::signature::ECDSA_P256_SHA256_ASN1;

    let public_key = base64url_decode(&stored_credential.public_key)
        .map_err(|e| AssertionError::Format(format!("Invalid public key: {e}")))?;

    let unparsed_public_key = UnparsedPublicKey::new(verification_algorithm, &public_key);

    let signature = base64url_decode(signature)
        .map_err(|e| AssertionError::Format(format!("Invalid signature: {e}")))?;

    // Signed payload is the raw concatenation, in this order
    let client_data_hash = digest::digest(&digest::SHA256, &client_data.raw_data);
    let mut signed_data = Vec::new();
    signed_data.extend_from_slice(&auth_data.raw_data);
    signed_data.extend_from_slice(client_data_hash.as_ref());

    match unparsed_public_key.verify(&signed_data, &signature) {
        Ok(_) => Ok(()),
        Err(_) => {
            tracing::warn!(
                "Signature verification failed for credential {}",
                stored_credential.credential_id
            );
            Err(AssertionError::SignatureInvalid)
        }
    }
}
