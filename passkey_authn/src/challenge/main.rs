use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::challenge::errors::ChallengeError;
use crate::challenge::storage::ChallengeStore;
use crate::challenge::types::{Challenge, ChallengePurpose};
use crate::config::{PASSKEY_CHALLENGE_SWEEP_INTERVAL, PASSKEY_CHALLENGE_TIMEOUT};
use crate::utils::gen_random_string;

/// Issues a fresh single-use challenge and persists it
///
/// The challenge value is 32 random bytes, base64url-encoded. The expiry is
/// `PASSKEY_CHALLENGE_TIMEOUT` seconds from now. Passing a user id binds the
/// challenge so that only a consume call for that user can redeem it.
pub async fn issue_challenge(
    purpose: ChallengePurpose,
    user_id: Option<&str>,
) -> Result<Challenge, ChallengeError> {
    let now = Utc::now();
    let challenge = Challenge {
        challenge_id: Uuid::new_v4().to_string(),
        challenge: gen_random_string(32)?,
        purpose,
        user_id: user_id.map(String::from),
        consumed: false,
        created_at: now,
        expires_at: now + Duration::seconds(*PASSKEY_CHALLENGE_TIMEOUT as i64),
    };

    ChallengeStore::store_challenge(&challenge).await?;

    tracing::debug!(
        "Issued {} challenge {} expiring at {}",
        challenge.purpose.as_str(),
        challenge.challenge_id,
        challenge.expires_at
    );

    Ok(challenge)
}

/// Validates and consumes a challenge by its client-presented value
///
/// Checks run in a fixed order: existence, expiry, prior consumption, purpose
/// binding, user binding. Only when every check passes is the challenge
/// flipped to consumed, and the flip is conditional in the store so that two
/// concurrent calls on the same value yield exactly one winner; the loser
/// gets `AlreadyUsed`.
///
/// # Returns
/// * `Ok(Challenge)` - The consumed challenge record
/// * `Err(ChallengeError)` - Which check failed, or a storage error
pub async fn consume_challenge(
    challenge_value: &str,
    expected_purpose: ChallengePurpose,
    expected_user: Option<&str>,
) -> Result<Challenge, ChallengeError> {
    let stored = ChallengeStore::get_challenge_by_value(challenge_value)
        .await?
        .ok_or(ChallengeError::NotFound)?;

    let now = Utc::now();
    if now > stored.expires_at {
        tracing::warn!(
            "Challenge {} expired {} seconds ago",
            stored.challenge_id,
            (now - stored.expires_at).num_seconds()
        );
        return Err(ChallengeError::Expired);
    }

    if stored.consumed {
        tracing::warn!("Challenge {} was already used", stored.challenge_id);
        return Err(ChallengeError::AlreadyUsed);
    }

    if stored.purpose != expected_purpose {
        tracing::warn!(
            "Challenge {} issued for {} but presented for {}",
            stored.challenge_id,
            stored.purpose.as_str(),
            expected_purpose.as_str()
        );
        return Err(ChallengeError::PurposeMismatch);
    }

    // An unbound challenge can be redeemed by anyone; a bound one only on
    // behalf of its owner.
    if let Some(bound_user) = &stored.user_id {
        if expected_user != Some(bound_user.as_str()) {
            tracing::warn!(
                "Challenge {} is bound to another user",
                stored.challenge_id
            );
            return Err(ChallengeError::UserMismatch);
        }
    }

    let won = ChallengeStore::mark_consumed(&stored.challenge_id).await?;
    if !won {
        tracing::warn!(
            "Challenge {} consumed concurrently by another request",
            stored.challenge_id
        );
        return Err(ChallengeError::AlreadyUsed);
    }

    tracing::debug!("Consumed challenge {}", stored.challenge_id);

    Ok(Challenge {
        consumed: true,
        ..stored
    })
}

/// Deletes unconsumed challenges whose expiry has passed
///
/// Consumed rows are left alone so that a replayed value keeps reporting
/// `AlreadyUsed` until its row ages out of usefulness.
pub async fn sweep_expired_challenges() -> Result<u64, ChallengeError> {
    let swept = ChallengeStore::delete_expired(Utc::now()).await?;
    if swept > 0 {
        tracing::debug!("Swept {} expired challenges", swept);
    }
    Ok(swept)
}

/// Spawns a background task sweeping expired challenges on a fixed interval
///
/// The returned handle can be aborted at shutdown; the task otherwise runs
/// for the life of the process.
pub fn start_challenge_sweeper() -> tokio::task::JoinHandle<()> {
    let interval = std::time::Duration::from_secs(*PASSKEY_CHALLENGE_SWEEP_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(e) = sweep_expired_challenges().await {
                tracing::warn!("Challenge sweep failed: {}", e);
            }
        }
    })
}
