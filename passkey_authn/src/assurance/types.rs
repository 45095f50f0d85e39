use serde::{Deserialize, Serialize};

/// One way a user proved their identity during a login
///
/// The set of methods is closed; policy matches over it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodTag {
    Password,
    EmailCode,
    SmsCode,
    Totp,
    Passkey,
}

/// How strong a completed login was, as an (ACR, AAL) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssuranceLevel {
    /// Authentication Context Class Reference URN for the tier
    pub acr: String,
    /// Authenticator Assurance Level, 1 (weakest) through 4
    pub aal: u8,
}
