mod challenge_store;
mod postgres;
mod sqlite;

pub(crate) use challenge_store::ChallengeStore;
