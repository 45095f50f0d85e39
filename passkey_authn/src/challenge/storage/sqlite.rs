use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::challenge::errors::ChallengeError;
use crate::challenge::types::Challenge;
use crate::storage::{DB_TABLE_CHALLENGES, validate_sqlite_table_schema};

// SQLite implementations
pub(super) async fn create_challenge_tables_sqlite(
    pool: &Pool<Sqlite>,
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
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            expires_at TIMESTAMP NOT NULL
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
pub(super) async fn validate_challenge_tables_sqlite(
    pool: &Pool<Sqlite>,
) -> Result<(), ChallengeError> {
    let challenge_table = DB_TABLE_CHALLENGES.as_str();

    // Define expected schema (column name, data type)
    let expected_columns = [
        ("challenge_id", "TEXT"),
        ("challenge", "TEXT"),
        ("purpose", "TEXT"),
        ("user_id", "TEXT"),
        ("consumed", "BOOLEAN"),
        ("created_at", "TIMESTAMP"),
        ("expires_at", "TIMESTAMP"),
    ];

    validate_sqlite_table_schema(
        pool,
        challenge_table,
        &expected_columns,
        ChallengeError::Storage,
    )
    .await
}

pub(super) async fn store_challenge_sqlite(
    pool: &Pool<Sqlite>,
    challenge: &Challenge,
) -> Result<(), ChallengeError> {
    let challenge_table = DB_TABLE_CHALLENGES.as_str();

    sqlx::query(&format!(
        r#"
        INSERT INTO {}
        (challenge_id, challenge, purpose, user_id, consumed, created_at, expires_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
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

pub(super) async fn get_challenge_by_value_sqlite(
    pool: &Pool<Sqlite>,
    challenge_value: &str,
) -> Result<Option<Challenge>, ChallengeError> {
    let challenge_table = DB_TABLE_CHALLENGES.as_str();

    sqlx::query_as::<_, Challenge>(&format!(
        r#"SELECT * FROM {} WHERE challenge = ?"#,
        challenge_table
    ))
    .bind(challenge_value)
    .fetch_optional(pool)
    .await
    .map_err(|e| ChallengeError::Storage(e.to_string()))
}

pub(super) async fn mark_consumed_sqlite(
    pool: &Pool<Sqlite>,
    challenge_id: &str,
) -> Result<bool, ChallengeError> {
    let challenge_table = DB_TABLE_CHALLENGES.as_str();

    // Conditional update, the guard makes concurrent consumers race for a
    // single winner
    let result = sqlx::query(&format!(
        r#"
        UPDATE {}
        SET consumed = ?
        WHERE challenge_id = ? AND consumed = ?
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

pub(super) async fn delete_expired_sqlite(
    pool: &Pool<Sqlite>,
    cutoff: DateTime<Utc>,
) -> Result<u64, ChallengeError> {
    let challenge_table = DB_TABLE_CHALLENGES.as_str();

    let result = sqlx::query(&format!(
        r#"DELETE FROM {} WHERE consumed = ? AND expires_at < ?"#,
        challenge_table
    ))
    .bind(false)
    .bind(cutoff)
    .execute(pool)
    .await
    .map_err(|e| ChallengeError::Storage(e.to_string()))?;

    Ok(result.rows_affected())
}
