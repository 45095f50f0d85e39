use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ceremony a challenge was issued for. A challenge can only be consumed by
/// the ceremony kind it was issued for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengePurpose {
    Registration,
    Authentication,
}

impl ChallengePurpose {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            ChallengePurpose::Registration => "registration",
            ChallengePurpose::Authentication => "authentication",
        }
    }

    pub(crate) fn from_db(value: &str) -> Option<Self> {
        match value {
            "registration" => Some(ChallengePurpose::Registration),
            "authentication" => Some(ChallengePurpose::Authentication),
            _ => None,
        }
    }
}

/// A single-use, time-bounded random value binding one client request to one
/// registration or authentication attempt.
///
/// A challenge transitions `unconsumed -> consumed` exactly once and never
/// back. Expired unconsumed challenges are garbage-collected by the sweeper.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Challenge {
    /// Identifier assigned at issuance
    pub challenge_id: String,
    /// Random value, base64url-encoded, presented back by the client
    pub challenge: String,
    /// Ceremony this challenge is valid for
    pub purpose: ChallengePurpose,
    /// Owning user for bound challenges, None for unbound ones
    pub user_id: Option<String>,
    /// Whether the challenge has been consumed
    pub consumed: bool,
    /// When the challenge was issued
    pub created_at: DateTime<Utc>,
    /// When the challenge stops being consumable
    pub expires_at: DateTime<Utc>,
}
