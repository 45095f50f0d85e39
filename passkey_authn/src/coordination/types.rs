use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::authenticator::VendorCategory;
use crate::challenge::ChallengePurpose;

use super::errors::ErrorKind;

/// Challenge handed to a client starting an authentication ceremony
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticationChallenge {
    pub challenge_id: String,
    /// Random value the authenticator must sign, base64url
    pub challenge: String,
    pub purpose: ChallengePurpose,
    pub expires_at: DateTime<Utc>,
}

/// Challenge handed to a client starting a registration ceremony
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationChallenge {
    pub challenge_id: String,
    pub challenge: String,
    pub expires_at: DateTime<Utc>,
}

/// Client submission completing an authentication ceremony
///
/// Binary fields are base64url strings; `client_data_json` carries the exact
/// bytes the authenticator signed, re-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticationRequest {
    pub credential_id: String,
    pub client_data_json: String,
    pub authenticator_data: String,
    pub signature: String,
    pub user_handle: Option<String>,
    /// Device identifier forwarded to the session issuer
    pub device_id: Option<String>,
    /// Client address forwarded to the session issuer
    pub ip_address: Option<String>,
}

/// Outcome of an authentication ceremony
///
/// Expected failures come back as `success: false` with a stable
/// `error_kind`; only infrastructure failures surface as errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// ACR URN of the completed login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acr: Option<String>,
    /// Authenticator assurance level of the completed login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aal: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl AuthenticationResponse {
    pub(super) fn failure(kind: ErrorKind) -> Self {
        Self {
            success: false,
            user_id: None,
            access_token: None,
            refresh_token: None,
            acr: None,
            aal: None,
            error_kind: Some(kind),
        }
    }
}

/// Client submission completing a registration ceremony
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub user_id: String,
    /// Challenge value issued by `begin_registration`, echoed back
    pub challenge: String,
    pub credential_id: String,
    /// Base64url of either a COSE EC2 key or an uncompressed P-256 point
    pub public_key: String,
    /// AAGUID of the authenticator model, when the client knows it
    pub authenticator_model_id: Option<String>,
    /// Label shown in credential listings; defaults to the catalog name
    pub device_label: Option<String>,
    pub initial_counter: Option<u32>,
    pub user_verified: Option<bool>,
    pub backed_up: Option<bool>,
}

/// Outcome of a registration ceremony
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl RegistrationResponse {
    pub(super) fn failure(kind: ErrorKind) -> Self {
        Self {
            success: false,
            credential_id: None,
            error_kind: Some(kind),
        }
    }
}

/// A stored credential decorated with catalog display metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialSummary {
    pub credential_id: String,
    pub device_label: String,
    /// Model name resolved from the authenticator catalog
    pub authenticator_name: String,
    pub icon_id: Option<String>,
    pub vendor_category: VendorCategory,
    pub counter: u32,
    pub user_verified: bool,
    pub backed_up: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}
