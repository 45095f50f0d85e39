//! Helpers for building signed assertions with real P-256 keys.
//!
//! These produce the same byte layouts an authenticator would: client data
//! JSON, the 37-byte authenticator data prefix, and an ASN.1 ECDSA signature
//! over `authenticator_data || SHA-256(client_data_json)`.

use ring::digest;
use ring::rand::SystemRandom;
use ring::signature::{ECDSA_P256_SHA256_ASN1_SIGNING, EcdsaKeyPair, KeyPair};

use crate::assertion::types::AssertionResponse;
use crate::config::{ORIGIN, PASSKEY_RP_ID};
use crate::utils::base64url_encode;

pub(crate) struct TestAuthenticator {
    pub(crate) key_pair: EcdsaKeyPair,
    pub(crate) rng: SystemRandom,
    /// Uncompressed SEC1 point, base64url-encoded, as stored in a credential
    pub(crate) public_key: String,
}

pub(crate) fn generate_authenticator() -> TestAuthenticator {
    let rng = SystemRandom::new();
    let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng)
        .expect("Failed to generate P-256 key pair");
    let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8.as_ref(), &rng)
        .expect("Failed to load P-256 key pair");
    let public_key =
        base64url_encode(key_pair.public_key().as_ref().to_vec()).expect("Failed to encode key");

    TestAuthenticator {
        key_pair,
        rng,
        public_key,
    }
}

pub(crate) fn build_client_data(type_: &str, challenge: &str, origin: &str) -> Vec<u8> {
    format!(
        r#"{{"type":"{type_}","challenge":"{challenge}","origin":"{origin}","crossOrigin":false}}"#
    )
    .into_bytes()
}

pub(crate) fn build_auth_data(rp_id: &str, flags: u8, counter: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity(37);
    data.extend_from_slice(digest::digest(&digest::SHA256, rp_id.as_bytes()).as_ref());
    data.push(flags);
    data.extend_from_slice(&counter.to_be_bytes());
    data
}

pub(crate) fn sign_assertion(
    authenticator: &TestAuthenticator,
    auth_data: &[u8],
    client_data: &[u8],
) -> Vec<u8> {
    let client_data_hash = digest::digest(&digest::SHA256, client_data);
    let mut signed_data = Vec::new();
    signed_data.extend_from_slice(auth_data);
    signed_data.extend_from_slice(client_data_hash.as_ref());

    authenticator
        .key_pair
        .sign(&authenticator.rng, &signed_data)
        .expect("Failed to sign assertion")
        .as_ref()
        .to_vec()
}

/// Build a complete, correctly-signed assertion response for the configured
/// origin and RP ID. Flags 0x05 = user present + user verified.
pub(crate) fn signed_assertion(
    authenticator: &TestAuthenticator,
    credential_id: &str,
    challenge: &str,
    counter: u32,
) -> AssertionResponse {
    let client_data = build_client_data("webauthn.get", challenge, &ORIGIN);
    let auth_data = build_auth_data(&PASSKEY_RP_ID, 0x05, counter);
    let signature = sign_assertion(authenticator, &auth_data, &client_data);

    AssertionResponse {
        credential_id: credential_id.to_string(),
        client_data_json: base64url_encode(client_data).unwrap(),
        authenticator_data: base64url_encode(auth_data).unwrap(),
        signature: base64url_encode(signature).unwrap(),
        user_handle: None,
    }
}
