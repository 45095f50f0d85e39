use uuid::Uuid;

use passkey_authn::{
    AuthenticatorCatalog, ErrorKind, begin_authentication, complete_authentication,
    list_user_credentials,
};

use crate::common::{
    CountingIssuer, FailingIssuer, TestAuthenticator, init_integration_environment,
    register_passkey,
};

fn unique_user() -> String {
    format!("user-{}", Uuid::new_v4())
}

/// The full login lifecycle of one credential: a successful assertion, a
/// byte-identical replay, a stale-counter clone signal, then recovery once
/// the authenticator advances its counter
#[tokio::test]
async fn test_authentication_ceremony_end_to_end() {
    init_integration_environment().await;

    let user_id = unique_user();
    let authenticator = TestAuthenticator::generate();
    let credential_id = register_passkey(&user_id, &authenticator).await;
    let issuer = CountingIssuer::new();

    // Fresh challenge, counter advances 0 -> 1
    let begin = begin_authentication(None).await.expect("begin failed");
    let request = authenticator.sign_authentication(&credential_id, &begin.challenge, 1);
    let response = complete_authentication(request.clone(), &issuer)
        .await
        .expect("complete failed");

    assert!(response.success);
    assert_eq!(response.user_id.as_deref(), Some(user_id.as_str()));
    assert_eq!(response.access_token.as_deref(), Some("access-1"));
    assert_eq!(response.refresh_token.as_deref(), Some("refresh-1"));
    assert_eq!(
        response.acr.as_deref(),
        Some("urn:passkey-authn:acr:hardware-key")
    );
    assert_eq!(response.aal, Some(3));
    assert_eq!(issuer.call_count(), 1);

    // Byte-identical replay: the challenge is spent, no session is issued
    let replay = complete_authentication(request, &issuer)
        .await
        .expect("replay should not be fatal");
    assert!(!replay.success);
    assert_eq!(replay.error_kind, Some(ErrorKind::AuthenticationFailed));
    assert_eq!(issuer.call_count(), 1);

    // Fresh challenge but the counter did not advance: clone signal
    let begin = begin_authentication(None).await.expect("begin failed");
    let stale = authenticator.sign_authentication(&credential_id, &begin.challenge, 1);
    let response = complete_authentication(stale, &issuer)
        .await
        .expect("stale counter should not be fatal");
    assert!(!response.success);
    assert_eq!(response.error_kind, Some(ErrorKind::CounterNotIncreased));
    assert_eq!(issuer.call_count(), 1);

    // The real authenticator advances and can log in again
    let begin = begin_authentication(None).await.expect("begin failed");
    let request = authenticator.sign_authentication(&credential_id, &begin.challenge, 2);
    let response = complete_authentication(request, &issuer)
        .await
        .expect("complete failed");
    assert!(response.success);
    assert_eq!(issuer.call_count(), 2);

    // The listing reflects the advanced counter
    let credentials = list_user_credentials(&user_id, AuthenticatorCatalog::builtin())
        .await
        .expect("list failed");
    assert_eq!(credentials[0].counter, 2);
}

/// Signatures from a different key over the right payload are rejected and
/// never reach the session issuer
#[tokio::test]
async fn test_wrong_key_cannot_login() {
    init_integration_environment().await;

    let user_id = unique_user();
    let registered = TestAuthenticator::generate();
    let impostor = TestAuthenticator::generate();
    let credential_id = register_passkey(&user_id, &registered).await;
    let issuer = CountingIssuer::new();

    let begin = begin_authentication(None).await.expect("begin failed");
    let forged = impostor.sign_authentication(&credential_id, &begin.challenge, 1);
    let response = complete_authentication(forged, &issuer)
        .await
        .expect("forgery should not be fatal");
    assert!(!response.success);
    assert_eq!(response.error_kind, Some(ErrorKind::SignatureInvalid));
    assert_eq!(issuer.call_count(), 0);

    // The failed attempt left the stored counter untouched
    let credentials = list_user_credentials(&user_id, AuthenticatorCatalog::builtin())
        .await
        .expect("list failed");
    assert_eq!(credentials[0].counter, 0);

    // And the failed attempt burned its challenge, so even the real key
    // cannot reuse it
    let retry = registered.sign_authentication(&credential_id, &begin.challenge, 1);
    let response = complete_authentication(retry, &issuer)
        .await
        .expect("burned challenge should not be fatal");
    assert!(!response.success);
    assert_eq!(response.error_kind, Some(ErrorKind::AuthenticationFailed));

    // A fresh challenge works
    let begin = begin_authentication(None).await.expect("begin failed");
    let request = registered.sign_authentication(&credential_id, &begin.challenge, 1);
    let response = complete_authentication(request, &issuer)
        .await
        .expect("complete failed");
    assert!(response.success);
    assert_eq!(issuer.call_count(), 1);
}

/// A challenge bound to one user survives a consume attempt through another
/// user's credential
#[tokio::test]
async fn test_user_bound_challenge_preserved_on_mismatch() {
    init_integration_environment().await;

    let owner = unique_user();
    let owner_authenticator = TestAuthenticator::generate();
    let owner_credential = register_passkey(&owner, &owner_authenticator).await;

    let other = unique_user();
    let other_authenticator = TestAuthenticator::generate();
    let other_credential = register_passkey(&other, &other_authenticator).await;

    let issuer = CountingIssuer::new();
    let begin = begin_authentication(Some(&owner)).await.expect("begin failed");

    // The other user's credential cannot consume the owner's challenge
    let request = other_authenticator.sign_authentication(&other_credential, &begin.challenge, 1);
    let response = complete_authentication(request, &issuer)
        .await
        .expect("mismatch should not be fatal");
    assert!(!response.success);
    assert_eq!(response.error_kind, Some(ErrorKind::AuthenticationFailed));

    // The mismatch did not burn it; the owner logs in with the same value
    let request = owner_authenticator.sign_authentication(&owner_credential, &begin.challenge, 1);
    let response = complete_authentication(request, &issuer)
        .await
        .expect("complete failed");
    assert!(response.success);
    assert_eq!(response.user_id.as_deref(), Some(owner.as_str()));
}

/// Discoverable credentials must carry a user handle matching the owner
#[tokio::test]
async fn test_discoverable_credential_user_handle() {
    init_integration_environment().await;

    let user_id = unique_user();
    let authenticator = TestAuthenticator::generate();
    let credential_id = register_passkey(&user_id, &authenticator).await;
    let issuer = CountingIssuer::new();

    // Flags 0x0d = user present + user verified + backup eligible, which
    // marks the credential discoverable, so the missing handle is an error
    let begin = begin_authentication(None).await.expect("begin failed");
    let request =
        authenticator.sign_authentication_with_flags(&credential_id, &begin.challenge, 1, 0x0d);
    let response = complete_authentication(request, &issuer)
        .await
        .expect("missing handle should not be fatal");
    assert!(!response.success);
    assert_eq!(response.error_kind, Some(ErrorKind::AuthenticationFailed));
    assert_eq!(issuer.call_count(), 0);

    // With the owner's handle the same assertion shape succeeds
    let begin = begin_authentication(None).await.expect("begin failed");
    let mut request =
        authenticator.sign_authentication_with_flags(&credential_id, &begin.challenge, 1, 0x0d);
    request.user_handle = Some(user_id.clone());
    let response = complete_authentication(request, &issuer)
        .await
        .expect("complete failed");
    assert!(response.success);
    assert_eq!(issuer.call_count(), 1);
}

/// Device and network context travel through to the session issuer together
/// with the fixed role
#[tokio::test]
async fn test_session_issuer_receives_context() {
    init_integration_environment().await;

    let user_id = unique_user();
    let authenticator = TestAuthenticator::generate();
    let credential_id = register_passkey(&user_id, &authenticator).await;
    let issuer = CountingIssuer::new();

    let begin = begin_authentication(None).await.expect("begin failed");
    let mut request = authenticator.sign_authentication(&credential_id, &begin.challenge, 1);
    request.device_id = Some("laptop-1".to_string());
    request.ip_address = Some("203.0.113.7".to_string());

    let response = complete_authentication(request, &issuer)
        .await
        .expect("complete failed");
    assert!(response.success);

    let calls = issuer.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].user_id, user_id);
    assert_eq!(calls[0].device_id.as_deref(), Some("laptop-1"));
    assert_eq!(calls[0].ip_address.as_deref(), Some("203.0.113.7"));
    assert_eq!(calls[0].role, "user");
}

/// A failing session issuer is an infrastructure error, not a verification
/// failure
#[tokio::test]
async fn test_session_issuer_failure_is_fatal() {
    init_integration_environment().await;

    let user_id = unique_user();
    let authenticator = TestAuthenticator::generate();
    let credential_id = register_passkey(&user_id, &authenticator).await;

    let begin = begin_authentication(None).await.expect("begin failed");
    let request = authenticator.sign_authentication(&credential_id, &begin.challenge, 1);

    let error = complete_authentication(request, &FailingIssuer)
        .await
        .expect_err("issuer failure must be fatal");
    assert_eq!(error.kind(), ErrorKind::StoreUnavailable);

    // Verification had already completed, so the counter advanced even
    // though no session came out
    let credentials = list_user_credentials(&user_id, AuthenticatorCatalog::builtin())
        .await
        .expect("list failed");
    assert_eq!(credentials[0].counter, 1);
}
