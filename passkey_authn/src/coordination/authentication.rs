use std::collections::BTreeSet;

use crate::assertion::{AssertionResponse, verify_assertion};
use crate::assurance::{AssurancePolicy, MethodTag};
use crate::challenge::{ChallengePurpose, issue_challenge};
use crate::session::SessionIssuer;

use super::errors::{CoordinationError, ErrorKind};
use super::types::{AuthenticationChallenge, AuthenticationRequest, AuthenticationResponse};

/// Issues an authentication challenge
///
/// Pass `bound_user` for a flow where the account is already known (for
/// example re-authentication); leave it `None` for discoverable-credential
/// login where the authenticator identifies the user.
pub async fn begin_authentication(
    bound_user: Option<&str>,
) -> Result<AuthenticationChallenge, CoordinationError> {
    let challenge = issue_challenge(ChallengePurpose::Authentication, bound_user).await?;

    Ok(AuthenticationChallenge {
        challenge_id: challenge.challenge_id,
        challenge: challenge.challenge,
        purpose: challenge.purpose,
        expires_at: challenge.expires_at,
    })
}

/// Completes an authentication ceremony and issues session tokens
///
/// Runs the full assertion verification, evaluates the assurance level of
/// the login and asks `session_issuer` for tokens. Expected verification
/// failures come back as `success: false` with a stable `error_kind`; a
/// failing store or session issuer is `Err`.
pub async fn complete_authentication(
    request: AuthenticationRequest,
    session_issuer: &dyn SessionIssuer,
) -> Result<AuthenticationResponse, CoordinationError> {
    let AuthenticationRequest {
        credential_id,
        client_data_json,
        authenticator_data,
        signature,
        user_handle,
        device_id,
        ip_address,
    } = request;

    let assertion = AssertionResponse {
        credential_id,
        client_data_json,
        authenticator_data,
        signature,
        user_handle,
    };

    let verified = match verify_assertion(&assertion).await {
        Ok(verified) => verified,
        Err(e) => return failure_or_fatal(e.into()),
    };

    let level = AssurancePolicy::default().evaluate(&BTreeSet::from([MethodTag::Passkey]));

    let tokens = session_issuer
        .issue(
            &verified.user_id,
            device_id.as_deref(),
            ip_address.as_deref(),
            "user",
        )
        .await
        .map_err(CoordinationError::from)?;

    tracing::debug!(
        "Issued session for user {} at {} / {}",
        verified.user_id,
        level.acr,
        level.aal
    );

    Ok(AuthenticationResponse {
        success: true,
        user_id: Some(verified.user_id),
        access_token: Some(tokens.access_token),
        refresh_token: Some(tokens.refresh_token),
        acr: Some(level.acr),
        aal: Some(level.aal),
        error_kind: None,
    })
}

fn failure_or_fatal(
    error: CoordinationError,
) -> Result<AuthenticationResponse, CoordinationError> {
    match error.kind() {
        ErrorKind::StoreUnavailable => Err(error),
        kind => Ok(AuthenticationResponse::failure(kind)),
    }
}
