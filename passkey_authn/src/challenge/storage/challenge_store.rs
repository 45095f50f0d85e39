use chrono::{DateTime, Utc};

use crate::challenge::errors::ChallengeError;
use crate::challenge::types::{Challenge, ChallengePurpose};
use crate::storage::GENERIC_DATA_STORE;

use super::postgres::{
    create_challenge_tables_postgres, delete_expired_postgres, get_challenge_by_value_postgres,
    mark_consumed_postgres, store_challenge_postgres, validate_challenge_tables_postgres,
};
use super::sqlite::{
    create_challenge_tables_sqlite, delete_expired_sqlite, get_challenge_by_value_sqlite,
    mark_consumed_sqlite, store_challenge_sqlite, validate_challenge_tables_sqlite,
};

pub(crate) struct ChallengeStore;

impl ChallengeStore {
    pub(crate) async fn init() -> Result<(), ChallengeError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            create_challenge_tables_sqlite(pool).await?;
            validate_challenge_tables_sqlite(pool).await
        } else if let Some(pool) = store.as_postgres() {
            create_challenge_tables_postgres(pool).await?;
            validate_challenge_tables_postgres(pool).await
        } else {
            Err(ChallengeError::Storage("Unsupported database type".into()))
        }
    }

    pub(crate) async fn store_challenge(challenge: &Challenge) -> Result<(), ChallengeError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            store_challenge_sqlite(pool, challenge).await
        } else if let Some(pool) = store.as_postgres() {
            store_challenge_postgres(pool, challenge).await
        } else {
            Err(ChallengeError::Storage("Unsupported database type".into()))
        }
    }

    pub(crate) async fn get_challenge_by_value(
        challenge_value: &str,
    ) -> Result<Option<Challenge>, ChallengeError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_challenge_by_value_sqlite(pool, challenge_value).await
        } else if let Some(pool) = store.as_postgres() {
            get_challenge_by_value_postgres(pool, challenge_value).await
        } else {
            Err(ChallengeError::Storage("Unsupported database type".into()))
        }
    }

    /// Flip `consumed` from false to true. Returns whether this call was the
    /// one that performed the flip; a false return means another consumer won
    /// the race or the challenge was consumed before.
    pub(crate) async fn mark_consumed(challenge_id: &str) -> Result<bool, ChallengeError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            mark_consumed_sqlite(pool, challenge_id).await
        } else if let Some(pool) = store.as_postgres() {
            mark_consumed_postgres(pool, challenge_id).await
        } else {
            Err(ChallengeError::Storage("Unsupported database type".into()))
        }
    }

    /// Delete unconsumed challenges whose expiry lies before `cutoff`.
    /// Consumed rows are left alone, so a consumed value keeps reporting
    /// AlreadyUsed instead of degrading to NotFound.
    pub(crate) async fn delete_expired(cutoff: DateTime<Utc>) -> Result<u64, ChallengeError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            delete_expired_sqlite(pool, cutoff).await
        } else if let Some(pool) = store.as_postgres() {
            delete_expired_postgres(pool, cutoff).await
        } else {
            Err(ChallengeError::Storage("Unsupported database type".into()))
        }
    }
}

use sqlx::{FromRow, Row, postgres::PgRow, sqlite::SqliteRow};

use crate::utils::UtilError;

fn decode_purpose(value: &str) -> Result<ChallengePurpose, sqlx::Error> {
    ChallengePurpose::from_db(value).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: "purpose".into(),
        source: Box::new(UtilError::Format(format!(
            "Unknown challenge purpose: {value}"
        ))),
    })
}

// Implement FromRow for Challenge to map the flat database row for SQLite
impl<'r> FromRow<'r, SqliteRow> for Challenge {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let challenge_id: String = row.try_get("challenge_id")?;
        let challenge: String = row.try_get("challenge")?;
        let purpose: String = row.try_get("purpose")?;
        let user_id: Option<String> = row.try_get("user_id")?;
        let consumed: bool = row.try_get("consumed")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let expires_at: DateTime<Utc> = row.try_get("expires_at")?;

        Ok(Challenge {
            challenge_id,
            challenge,
            purpose: decode_purpose(&purpose)?,
            user_id,
            consumed,
            created_at,
            expires_at,
        })
    }
}

// Implement FromRow for Challenge to map the flat database row for PostgreSQL
impl<'r> FromRow<'r, PgRow> for Challenge {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let challenge_id: String = row.try_get("challenge_id")?;
        let challenge: String = row.try_get("challenge")?;
        let purpose: String = row.try_get("purpose")?;
        let user_id: Option<String> = row.try_get("user_id")?;
        let consumed: bool = row.try_get("consumed")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let expires_at: DateTime<Utc> = row.try_get("expires_at")?;

        Ok(Challenge {
            challenge_id,
            challenge,
            purpose: decode_purpose(&purpose)?,
            user_id,
            consumed,
            created_at,
            expires_at,
        })
    }
}
