use ring::digest;
use serde::{Deserialize, Serialize};

use crate::assertion::errors::AssertionError;
use crate::config::{ORIGIN, PASSKEY_RP_ID, PASSKEY_USER_VERIFICATION};
use crate::utils::base64url_decode;

/// A client-submitted assertion over a previously issued challenge.
///
/// Binary fields are base64url strings. `client_data_json` carries the exact
/// bytes the authenticator signed, re-encoded, so the hash computed here
/// matches what was signed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssertionResponse {
    pub credential_id: String,
    pub client_data_json: String,
    pub authenticator_data: String,
    pub signature: String,
    pub user_handle: Option<String>,
}

/// Outcome of a successfully verified assertion.
#[derive(Clone, Debug)]
pub struct VerifiedAssertion {
    pub user_id: String,
    pub credential_id: String,
    /// Counter the authenticator reported for this assertion
    pub counter: u32,
}

#[derive(Debug)]
pub(crate) struct ParsedClientData {
    pub(crate) challenge: String,
    pub(crate) origin: String,
    pub(crate) type_: String,
    pub(crate) raw_data: Vec<u8>,
}

impl ParsedClientData {
    pub(crate) fn from_base64(client_data_json: &str) -> Result<Self, AssertionError> {
        let raw_data = base64url_decode(client_data_json)
            .map_err(|e| AssertionError::Format(format!("Failed to decode: {e}")))?;

        let data_str = String::from_utf8(raw_data.clone())
            .map_err(|e| AssertionError::Format(format!("Invalid UTF-8: {e}")))?;

        let data: serde_json::Value = serde_json::from_str(&data_str)
            .map_err(|e| AssertionError::Format(format!("Invalid JSON: {e}")))?;

        let challenge = data["challenge"]
            .as_str()
            .ok_or_else(|| AssertionError::ClientData("Missing challenge".into()))?
            .to_string();

        Ok(Self {
            challenge,
            origin: data["origin"]
                .as_str()
                .ok_or_else(|| AssertionError::ClientData("Missing origin".into()))?
                .to_string(),
            type_: data["type"]
                .as_str()
                .ok_or_else(|| AssertionError::ClientData("Missing type".into()))?
                .to_string(),
            raw_data,
        })
    }

    /// Check origin and ceremony type. Challenge equality is established by
    /// consuming the embedded value against the store, not here.
    pub(crate) fn verify(&self) -> Result<(), AssertionError> {
        if self.origin != *ORIGIN {
            return Err(AssertionError::ClientData(format!(
                "Origin mismatch: expected {}, got {}",
                *ORIGIN, self.origin
            )));
        }

        if self.type_ != "webauthn.get" {
            return Err(AssertionError::ClientData(format!(
                "Ceremony type is not webauthn.get: {}",
                self.type_
            )));
        }

        Ok(())
    }
}

/// Authenticator data flag bits (WebAuthn Level 2, §6.1)
mod auth_data_flags {
    /// UP, user present
    pub(super) const UP: u8 = 1 << 0;
    /// UV, user verified
    pub(super) const UV: u8 = 1 << 2;
    /// BE, backup eligible. Set for discoverable credentials.
    pub(super) const BE: u8 = 1 << 3;
    /// BS, backed up
    pub(super) const BS: u8 = 1 << 4;
}

#[derive(Debug)]
pub(crate) struct AuthenticatorData {
    pub(crate) rp_id_hash: Vec<u8>,
    pub(crate) flags: u8,
    pub(crate) counter: u32,
    pub(crate) raw_data: Vec<u8>,
}

impl AuthenticatorData {
    /// Parse base64url-encoded authenticator data.
    ///
    /// The fixed header is 37 bytes: a 32-byte rpIdHash, one flags byte, and
    /// a big-endian u32 signature counter. Attested credential data and
    /// extensions may follow; they stay in `raw_data` untouched since the
    /// signature covers the whole buffer.
    pub(crate) fn from_base64(auth_data: &str) -> Result<Self, AssertionError> {
        let data = base64url_decode(auth_data)
            .map_err(|e| AssertionError::Format(format!("Failed to decode: {e}")))?;

        if data.len() < 37 {
            return Err(AssertionError::AuthenticatorData(
                "Authenticator data too short".into(),
            ));
        }

        Ok(Self {
            rp_id_hash: data[..32].to_vec(),
            flags: data[32],
            counter: u32::from_be_bytes([data[33], data[34], data[35], data[36]]),
            raw_data: data,
        })
    }

    pub(crate) fn is_user_present(&self) -> bool {
        (self.flags & auth_data_flags::UP) != 0
    }

    pub(crate) fn is_user_verified(&self) -> bool {
        (self.flags & auth_data_flags::UV) != 0
    }

    /// Discoverable credential, previously called a resident key
    pub(crate) fn is_discoverable(&self) -> bool {
        (self.flags & auth_data_flags::BE) != 0
    }

    pub(crate) fn is_backed_up(&self) -> bool {
        (self.flags & auth_data_flags::BS) != 0
    }

    /// Check the rpIdHash against our RP ID and enforce the flag policy.
    pub(crate) fn verify(&self) -> Result<(), AssertionError> {
        let expected_hash = digest::digest(&digest::SHA256, PASSKEY_RP_ID.as_bytes());
        if self.rp_id_hash != expected_hash.as_ref() {
            return Err(AssertionError::AuthenticatorData(format!(
                "rpIdHash does not match RP ID {}",
                *PASSKEY_RP_ID
            )));
        }

        if !self.is_user_present() {
            return Err(AssertionError::AuthenticatorData(
                "User presence flag not set".into(),
            ));
        }

        // UV is only mandatory under the "required" policy
        if *PASSKEY_USER_VERIFICATION == "required" && !self.is_user_verified() {
            return Err(AssertionError::AuthenticatorData(format!(
                "User verification required but flag not set (flags: {:02x})",
                self.flags
            )));
        }

        tracing::debug!(
            "Authenticator data verified: user present: {}, user verified: {}, discoverable: {}, backed up: {}",
            self.is_user_present(),
            self.is_user_verified(),
            self.is_discoverable(),
            self.is_backed_up(),
        );

        Ok(())
    }
}
