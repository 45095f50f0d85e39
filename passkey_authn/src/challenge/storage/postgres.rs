use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::challenge::errors::ChallengeError;
use crate::challenge::types::Challenge;
use crate::storage::{DB_TABLE_CHALLENGES, validate_postgres_table_schema};

// PostgreSQL implementations
pub(super) async fn create_challenge_tables_postgres(
    pool: &Pool<Postgres>,
) -> Result<(), ChallengeError> {
    let challenge_table = DB_TABLE_CHALLENGES.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            challenge_id TEXT PRIMARY KEY NOT NULL,
            challenge TEXT NOT NULL UNIQUE,
            purpose TEXT NOT NULL,
            user_id TEXT,
            consumed BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
            expires_at TIMESTAMPTZ NOT NULL
        )
        "#,
        challenge_table
    ))
    .execute(pool)
    .await
    .map_err(|e| ChallengeError::Storage(e.to_string()))?;

    sqlx::query(&format!(
        r#"
        CREATE INDEX IF NOT EXISTS idx_{}_expires_at ON {}(expires_at);
        "#,
        challenge_table.replace(".", "_"),
        challenge_table
    ))
    .execute(pool)
    .await
    .map_err(|e| ChallengeError::Storage(e.to_string()))?;

    Ok(())
}

/// Validates that the challenge table schema matches what we expect
pub(super) async fn validate_challenge_tables_postgres(
    pool: &Pool<Postgres>,
) -> Result<(), ChallengeError> {
    let challenge_table = DB_TABLE_CHALLENGES.as_str();

    // Define expected schema (column name, data type)
    let expected_columns = [
        ("challenge_id", "text"),
        ("challenge", "text"),
        ("purpose", "text"),
        ("user_id", "text"),
        ("consumed", "boolean"),
        ("created_at", "timestamp with time zone"),
        ("expires_at", "timestamp with time zone"),
    ];

    validate_postgres_table_schema(
        pool,
        challenge_table,
        &expected_columns,
        ChallengeError::Storage,
    )
    .await
}

pub(super) async fn store_challenge_postgres(
    pool: &Pool<Postgres>,
    challenge: &Challenge,
) -> Result<(), ChallengeError> {
    let challenge_table = DB_TABLE_CHALLENGES.as_str();

    sqlx::query(&format!(
        r#"
        INSERT INTO {}
        (challenge_id, challenge, purpose, user_id, consumed, created_at, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
        challenge_table
    ))
    .bind(&challenge.challenge_id)
    .bind(&challenge.challenge)
    .bind(challenge.purpose.as_str())
    .bind(&challenge.user_id)
    .bind(challenge.consumed)
    .bind(challenge.created_at)
    .bind(challenge.expires_at)
    .execute(pool)
    .await
    .map_err(|e| ChallengeError::Storage(e.to_string()))?;

    Ok(())
}

pub(super) async fn get_challenge_by_value_postgres(
    pool: &Pool<Postgres>,
    challenge_value: &str,
) -> Result<Option<Challenge>, ChallengeError> {
    let challenge_table = DB_TABLE_CHALLENGES.as_str();

    sqlx::query_as::<_, Challenge>(&format!(
        r#"SELECT * FROM {} WHERE challenge = $1"#,
        challenge_table
    ))
    .bind(challenge_value)
    .fetch_optional(pool)
    .await
    .map_err(|e| ChallengeError::Storage(e.to_string()))
}

pub(super) async fn mark_consumed_postgres(
    pool: &Pool<Postgres>,
    challenge_id: &str,
) -> Result<bool, ChallengeError> {
    let challenge_table = DB_TABLE_CHALLENGES.as_str();

    // Conditional update, the guard makes concurrent consumers race for a
    // single winner
    let result = sqlx::query(&format!(
        r#"
        UPDATE {}
        SET consumed = $1
        WHERE challenge_id = $2 AND consumed = $3
        "#,
        challenge_table
    ))
    .bind(true)
    .bind(challenge_id)
    .bind(false)
    .execute(pool)
    .await
    .map_err(|e| ChallengeError::Storage(e.to_string()))?;

    Ok(result.rows_affected() == 1)
}

pub(super) async fn delete_expired_postgres(
    pool: &Pool<Postgres>,
    cutoff: DateTime<Utc>,
) -> Result<u64, ChallengeError> {
    let challenge_table = DB_TABLE_CHALLENGES.as_str();

    let result = sqlx::query(&format!(
        r#"DELETE FROM {} WHERE consumed = $1 AND expires_at < $2"#,
        challenge_table
    ))
    .bind(false)
    .bind(cutoff)
    .execute(pool)
    .await
    .map_err(|e| ChallengeError::Storage(e.to_string()))?;

    Ok(result.rows_affected())
}
