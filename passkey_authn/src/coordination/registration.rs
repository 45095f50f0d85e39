use ciborium::value::{Integer, Value as CborValue};

use crate::authenticator::AuthenticatorCatalog;
use crate::challenge::{ChallengePurpose, consume_challenge, issue_challenge};
use crate::credential::{CredentialMetadata, register_credential};
use crate::utils::{base64url_decode, base64url_encode};

use super::errors::{CoordinationError, ErrorKind};
use super::types::{RegistrationChallenge, RegistrationRequest, RegistrationResponse};

/// Issues a registration challenge bound to the given user
///
/// Only a completion naming the same user can consume it.
pub async fn begin_registration(user_id: &str) -> Result<RegistrationChallenge, CoordinationError> {
    let challenge = issue_challenge(ChallengePurpose::Registration, Some(user_id)).await?;

    Ok(RegistrationChallenge {
        challenge_id: challenge.challenge_id,
        challenge: challenge.challenge,
        expires_at: challenge.expires_at,
    })
}

/// Completes a registration ceremony and stores the new credential
///
/// Consumes the echoed challenge first, normalizes the submitted public key
/// to an uncompressed P-256 point, and registers the credential with its
/// display label resolved from `catalog` when the client supplied none.
/// Expected failures (spent challenge, duplicate id, malformed key) come
/// back as `success: false`; only infrastructure failures are `Err`.
pub async fn complete_registration(
    request: RegistrationRequest,
    catalog: &AuthenticatorCatalog,
) -> Result<RegistrationResponse, CoordinationError> {
    if let Err(e) = consume_challenge(
        &request.challenge,
        ChallengePurpose::Registration,
        Some(&request.user_id),
    )
    .await
    {
        return failure_or_fatal(e.into());
    }

    let public_key = match normalize_public_key(&request.public_key) {
        Ok(key) => key,
        Err(error) => return failure_or_fatal(error.log()),
    };

    let info = catalog.lookup(request.authenticator_model_id.as_deref());
    let metadata = CredentialMetadata {
        aaguid: request.authenticator_model_id.clone(),
        user_verified: request.user_verified.unwrap_or(false),
        backed_up: request.backed_up.unwrap_or(false),
        device_label: request.device_label.clone().unwrap_or(info.name),
        initial_counter: request.initial_counter.unwrap_or(0),
    };

    match register_credential(&request.user_id, &request.credential_id, &public_key, metadata).await
    {
        Ok(credential) => Ok(RegistrationResponse {
            success: true,
            credential_id: Some(credential.credential_id),
            error_kind: None,
        }),
        Err(e) => failure_or_fatal(e.into()),
    }
}

fn failure_or_fatal(
    error: CoordinationError,
) -> Result<RegistrationResponse, CoordinationError> {
    match error.kind() {
        ErrorKind::StoreUnavailable => Err(error),
        kind => Ok(RegistrationResponse::failure(kind)),
    }
}

/// Normalizes a submitted public key to an uncompressed P-256 point
///
/// Accepts base64url of either the raw 65-byte SEC1 encoding or a COSE EC2
/// key as carried in attested credential data; the stored form is always
/// SEC1.
fn normalize_public_key(encoded: &str) -> Result<String, CoordinationError> {
    let raw = base64url_decode(encoded)
        .map_err(|e| CoordinationError::InvalidPublicKey(format!("Failed to decode: {e}")))?;

    if raw.len() == 65 && raw[0] == 0x04 {
        return base64url_encode(raw)
            .map_err(|e| CoordinationError::InvalidPublicKey(e.to_string()));
    }

    let (x_coord, y_coord) = extract_key_coordinates(&raw)?;
    if x_coord.len() != 32 || y_coord.len() != 32 {
        return Err(CoordinationError::InvalidPublicKey(
            "Key coordinates must be 32 bytes".to_string(),
        ));
    }

    let mut public_key = Vec::with_capacity(65);
    public_key.push(0x04); // Uncompressed point format
    public_key.extend_from_slice(&x_coord);
    public_key.extend_from_slice(&y_coord);

    base64url_encode(public_key).map_err(|e| CoordinationError::InvalidPublicKey(e.to_string()))
}

fn extract_key_coordinates(key_bytes: &[u8]) -> Result<(Vec<u8>, Vec<u8>), CoordinationError> {
    let public_key_cbor: CborValue = ciborium::de::from_reader(key_bytes).map_err(|e| {
        tracing::error!("Invalid public key CBOR: {}", e);
        CoordinationError::InvalidPublicKey(format!("Invalid CBOR: {e}"))
    })?;

    if let CborValue::Map(map) = public_key_cbor {
        let mut x_coord = None;
        let mut y_coord = None;

        for (key, value) in map {
            if let CborValue::Integer(i) = key {
                if i == Integer::from(-2) {
                    if let CborValue::Bytes(x) = value {
                        x_coord = Some(x);
                    }
                } else if i == Integer::from(-3) {
                    if let CborValue::Bytes(y) = value {
                        y_coord = Some(y);
                    }
                }
            }
        }

        match (x_coord, y_coord) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(CoordinationError::InvalidPublicKey(
                "Missing or invalid key coordinates".to_string(),
            )),
        }
    } else {
        Err(CoordinationError::InvalidPublicKey(
            "Invalid public key format".to_string(),
        ))
    }
}
