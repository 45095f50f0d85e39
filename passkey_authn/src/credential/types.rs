use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored public-key credential registered by an authenticator.
///
/// This is everything needed to verify later assertions from the same
/// authenticator: the public key, the signature counter and the owning user.
/// The credential id is globally unique across all users, not merely within
/// one user's credentials.
///
/// A credential is created on successful registration, mutated only by
/// `record_successful_use` after a verified assertion, and removed by
/// revocation. Failed assertions never touch it.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Credential {
    /// Credential ID as reported by the authenticator, base64url-encoded
    pub credential_id: String,
    /// User that owns this credential
    pub user_id: String,
    /// Uncompressed P-256 public key point, base64url-encoded
    pub public_key: String,
    /// Signature counter reported by the authenticator, 0 if unsupported
    pub counter: u32,
    /// AAGUID of the authenticator model, if it reported one
    pub aaguid: Option<String>,
    /// Whether the user was verified (PIN, biometric) during registration
    pub user_verified: bool,
    /// Whether the credential is synced to other devices
    pub backed_up: bool,
    /// Human-readable label shown in credential listings
    pub device_label: String,
    /// When the credential was registered
    pub created_at: DateTime<Utc>,
    /// When the credential last completed a successful assertion
    pub last_used_at: DateTime<Utc>,
}

/// Descriptive fields captured alongside the key material at registration.
#[derive(Clone, Debug, Default)]
pub struct CredentialMetadata {
    pub aaguid: Option<String>,
    pub user_verified: bool,
    pub backed_up: bool,
    pub device_label: String,
    /// Counter reported by the registration ceremony, 0 when absent
    pub initial_counter: u32,
}
