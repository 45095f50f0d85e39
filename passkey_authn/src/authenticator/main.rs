use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Deserialize;

use super::types::AuthenticatorInfo;

const CATALOG_JSON: &str = include_str!("../../assets/authenticators.json");

static BUILTIN_CATALOG: LazyLock<AuthenticatorCatalog> = LazyLock::new(|| {
    AuthenticatorCatalog::from_json(CATALOG_JSON)
        .expect("Embedded authenticator catalog must be valid JSON")
});

/// Maps AAGUIDs to authenticator display metadata
///
/// The catalog is plain data passed by reference. `builtin()` returns the
/// embedded snapshot of well-known models; deployments with their own model
/// inventory construct one with `from_json`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticatorCatalog(HashMap<String, AuthenticatorInfo>);

impl AuthenticatorCatalog {
    /// The catalog of well-known authenticator models embedded at build time
    pub fn builtin() -> &'static Self {
        &BUILTIN_CATALOG
    }

    /// Parses a catalog from a JSON object keyed by AAGUID
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Resolves display metadata for an AAGUID
    ///
    /// An absent or unrecognized id resolves to the generic "Passkey" entry;
    /// lookup never fails.
    pub fn lookup(&self, aaguid: Option<&str>) -> AuthenticatorInfo {
        aaguid
            .and_then(|id| self.0.get(id))
            .cloned()
            .unwrap_or_default()
    }
}
