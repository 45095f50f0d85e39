//! Shared fixtures for integration tests
//!
//! Emulates an authenticator with a real P-256 key pair, producing the same
//! byte layouts a browser would submit: client data JSON, the 37-byte
//! authenticator data prefix and an ASN.1 ECDSA signature over
//! `authenticator_data || SHA-256(client_data_json)`.

use std::sync::{Mutex, Once};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use ciborium::value::{Integer, Value as CborValue};
use ring::digest;
use ring::rand::SystemRandom;
use ring::signature::{ECDSA_P256_SHA256_ASN1_SIGNING, EcdsaKeyPair, KeyPair};
use uuid::Uuid;

use passkey_authn::{
    AuthenticationRequest, AuthenticatorCatalog, IssuedTokens, RegistrationRequest, SessionError,
    SessionIssuer,
};

/// Loads the test environment and initializes the library
///
/// Environment variables come from `.env_test` (with a fallback to `.env`)
/// once per process; store initialization is idempotent, so every test can
/// call this first.
pub async fn init_integration_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }
    });

    passkey_authn::init()
        .await
        .expect("Failed to initialize authentication core");
}

/// Origin the test environment is configured for
pub fn test_origin() -> String {
    std::env::var("ORIGIN").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// RP ID derived from the test origin, the way the library derives it
pub fn test_rp_id() -> String {
    url::Url::parse(&test_origin())
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()))
        .expect("Test origin must be a valid URL")
}

pub fn build_client_data(type_: &str, challenge: &str, origin: &str) -> Vec<u8> {
    format!(
        r#"{{"type":"{type_}","challenge":"{challenge}","origin":"{origin}","crossOrigin":false}}"#
    )
    .into_bytes()
}

pub fn build_auth_data(rp_id: &str, flags: u8, counter: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(37);
    data.extend_from_slice(digest::digest(&digest::SHA256, rp_id.as_bytes()).as_ref());
    data.push(flags);
    data.extend_from_slice(&counter.to_be_bytes());
    data
}

/// An emulated authenticator holding a P-256 key pair
pub struct TestAuthenticator {
    key_pair: EcdsaKeyPair,
    rng: SystemRandom,
    /// Uncompressed SEC1 point
    public_key: Vec<u8>,
}

impl TestAuthenticator {
    pub fn generate() -> Self {
        let rng = SystemRandom::new();
        let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng)
            .expect("Failed to generate P-256 key pair");
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref(), &rng)
                .expect("Failed to load P-256 key pair");
        let public_key = key_pair.public_key().as_ref().to_vec();

        Self {
            key_pair,
            rng,
            public_key,
        }
    }

    /// Public key as the base64url SEC1 point the registration API accepts
    pub fn sec1_public_key(&self) -> String {
        general_purpose::URL_SAFE_NO_PAD.encode(&self.public_key)
    }

    /// Public key as a base64url COSE EC2 map, the form carried in attested
    /// credential data
    pub fn cose_public_key(&self) -> String {
        let map = CborValue::Map(vec![
            (
                CborValue::Integer(Integer::from(1)), // kty: EC2
                CborValue::Integer(Integer::from(2)),
            ),
            (
                CborValue::Integer(Integer::from(3)), // alg: ES256
                CborValue::Integer(Integer::from(-7)),
            ),
            (
                CborValue::Integer(Integer::from(-1)), // crv: P-256
                CborValue::Integer(Integer::from(1)),
            ),
            (
                CborValue::Integer(Integer::from(-2)),
                CborValue::Bytes(self.public_key[1..33].to_vec()),
            ),
            (
                CborValue::Integer(Integer::from(-3)),
                CborValue::Bytes(self.public_key[33..65].to_vec()),
            ),
        ]);

        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&map, &mut bytes).expect("Failed to serialize COSE key");
        general_purpose::URL_SAFE_NO_PAD.encode(&bytes)
    }

    pub fn sign(&self, auth_data: &[u8], client_data: &[u8]) -> Vec<u8> {
        let client_data_hash = digest::digest(&digest::SHA256, client_data);
        let mut signed_data = Vec::new();
        signed_data.extend_from_slice(auth_data);
        signed_data.extend_from_slice(client_data_hash.as_ref());

        self.key_pair
            .sign(&self.rng, &signed_data)
            .expect("Failed to sign assertion")
            .as_ref()
            .to_vec()
    }

    /// Builds a correctly signed authentication request for the test origin
    /// and RP ID. Flags 0x05 = user present + user verified.
    pub fn sign_authentication(
        &self,
        credential_id: &str,
        challenge: &str,
        counter: u32,
    ) -> AuthenticationRequest {
        self.sign_authentication_with_flags(credential_id, challenge, counter, 0x05)
    }

    pub fn sign_authentication_with_flags(
        &self,
        credential_id: &str,
        challenge: &str,
        counter: u32,
        flags: u8,
    ) -> AuthenticationRequest {
        let client_data = build_client_data("webauthn.get", challenge, &test_origin());
        let auth_data = build_auth_data(&test_rp_id(), flags, counter);
        let signature = self.sign(&auth_data, &client_data);

        AuthenticationRequest {
            credential_id: credential_id.to_string(),
            client_data_json: general_purpose::URL_SAFE_NO_PAD.encode(&client_data),
            authenticator_data: general_purpose::URL_SAFE_NO_PAD.encode(&auth_data),
            signature: general_purpose::URL_SAFE_NO_PAD.encode(&signature),
            user_handle: None,
            device_id: None,
            ip_address: None,
        }
    }
}

/// Registers a credential for `user_id` through the public ceremony and
/// returns its credential id
pub async fn register_passkey(user_id: &str, authenticator: &TestAuthenticator) -> String {
    let begin = passkey_authn::begin_registration(user_id)
        .await
        .expect("begin_registration failed");

    let credential_id = format!("cred-{}", Uuid::new_v4());
    let request = RegistrationRequest {
        user_id: user_id.to_string(),
        challenge: begin.challenge,
        credential_id: credential_id.clone(),
        public_key: authenticator.cose_public_key(),
        authenticator_model_id: None,
        device_label: None,
        initial_counter: None,
        user_verified: Some(true),
        backed_up: None,
    };

    let response =
        passkey_authn::complete_registration(request, AuthenticatorCatalog::builtin())
            .await
            .expect("complete_registration failed");
    assert!(
        response.success,
        "registration should succeed, got {:?}",
        response.error_kind
    );

    credential_id
}

/// One recorded call to a session issuer fake
#[derive(Debug, Clone)]
pub struct IssueCall {
    pub user_id: String,
    pub device_id: Option<String>,
    pub ip_address: Option<String>,
    pub role: String,
}

/// Session issuer fake that returns deterministic tokens and records calls
pub struct CountingIssuer {
    calls: Mutex<Vec<IssueCall>>,
}

impl CountingIssuer {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<IssueCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for CountingIssuer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionIssuer for CountingIssuer {
    async fn issue(
        &self,
        user_id: &str,
        device_id: Option<&str>,
        ip_address: Option<&str>,
        role: &str,
    ) -> Result<IssuedTokens, SessionError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(IssueCall {
            user_id: user_id.to_string(),
            device_id: device_id.map(String::from),
            ip_address: ip_address.map(String::from),
            role: role.to_string(),
        });

        Ok(IssuedTokens {
            access_token: format!("access-{}", calls.len()),
            refresh_token: format!("refresh-{}", calls.len()),
        })
    }
}

/// Session issuer fake whose backend is always down
pub struct FailingIssuer;

#[async_trait]
impl SessionIssuer for FailingIssuer {
    async fn issue(
        &self,
        _user_id: &str,
        _device_id: Option<&str>,
        _ip_address: Option<&str>,
        _role: &str,
    ) -> Result<IssuedTokens, SessionError> {
        Err(SessionError::Issuance("token backend offline".to_string()))
    }
}
