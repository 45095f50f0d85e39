use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token pair minted by a [`SessionIssuer`] after a verified login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Token minting failed
    #[error("Issuance error: {0}")]
    Issuance(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Mints access and refresh tokens for a verified login
///
/// Session management lives outside this crate. The embedding application
/// provides the implementation; the authentication flow invokes it only
/// after assertion verification succeeds, with the device and network
/// context it was handed.
#[async_trait]
pub trait SessionIssuer: Send + Sync {
    async fn issue(
        &self,
        user_id: &str,
        device_id: Option<&str>,
        ip_address: Option<&str>,
        role: &str,
    ) -> Result<IssuedTokens, SessionError>;
}
