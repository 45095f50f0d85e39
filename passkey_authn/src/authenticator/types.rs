use serde::{Deserialize, Serialize};

/// Display metadata for one authenticator model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatorInfo {
    /// Human-readable model name, e.g. "YubiKey 5 Series"
    pub name: String,
    /// Slug identifying the model's icon, when one is available
    pub icon_id: Option<String>,
    /// Broad grouping of the authenticator vendor
    #[serde(default)]
    pub vendor_category: VendorCategory,
}

impl Default for AuthenticatorInfo {
    fn default() -> Self {
        Self {
            name: "Passkey".to_string(),
            icon_id: None,
            vendor_category: VendorCategory::Unknown,
        }
    }
}

/// Vendor grouping for authenticator models
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorCategory {
    /// Built into the OS or browser (Windows Hello, iCloud Keychain)
    Platform,
    /// Roaming hardware token (YubiKey, Feitian)
    SecurityKey,
    /// Third-party credential manager (1Password, Bitwarden)
    PasswordManager,
    #[default]
    Unknown,
}
