mod errors;
mod main;
mod storage;
mod types;

pub use errors::ChallengeError;
pub use main::{
    consume_challenge, issue_challenge, start_challenge_sweeper, sweep_expired_challenges,
};
pub use types::{Challenge, ChallengePurpose};

pub(crate) use storage::ChallengeStore;

pub(crate) async fn init() -> Result<(), ChallengeError> {
    ChallengeStore::init().await
}
