use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::credential::errors::CredentialError;
use crate::credential::types::Credential;
use crate::storage::{DB_TABLE_CREDENTIALS, validate_sqlite_table_schema};

use super::credential_store::map_unique_violation;

// SQLite implementations
pub(super) async fn create_credential_tables_sqlite(
    pool: &Pool<Sqlite>,
) -> Result<(), CredentialError> {
    let credential_table = DB_TABLE_CREDENTIALS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            credential_id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL,
            public_key TEXT NOT NULL,
            counter BIGINT NOT NULL DEFAULT 0,
            aaguid TEXT,
            user_verified BOOLEAN NOT NULL DEFAULT FALSE,
            backed_up BOOLEAN NOT NULL DEFAULT FALSE,
            device_label TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            last_used_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
        credential_table
    ))
    .execute(pool)
    .await
    .map_err(|e| CredentialError::Storage(e.to_string()))?;

    sqlx::query(&format!(
        r#"
        CREATE INDEX IF NOT EXISTS idx_{}_user_id ON {}(user_id);
        "#,
        credential_table.replace(".", "_"),
        credential_table
    ))
    .execute(pool)
    .await
    .map_err(|e| CredentialError::Storage(e.to_string()))?;

    Ok(())
}

/// Validates that the credential table schema matches what we expect
pub(super) async fn validate_credential_tables_sqlite(
    pool: &Pool<Sqlite>,
) -> Result<(), CredentialError> {
    let credential_table = DB_TABLE_CREDENTIALS.as_str();

    // Define expected schema (column name, data type)
    let expected_columns = [
        ("credential_id", "TEXT"),
        ("user_id", "TEXT"),
        ("public_key", "TEXT"),
        ("counter", "BIGINT"),
        ("aaguid", "TEXT"),
        ("user_verified", "BOOLEAN"),
        ("backed_up", "BOOLEAN"),
        ("device_label", "TEXT"),
        ("created_at", "TIMESTAMP"),
        ("last_used_at", "TIMESTAMP"),
    ];

    validate_sqlite_table_schema(
        pool,
        credential_table,
        &expected_columns,
        CredentialError::Storage,
    )
    .await
}

pub(super) async fn insert_credential_sqlite(
    pool: &Pool<Sqlite>,
    credential: &Credential,
) -> Result<(), CredentialError> {
    let counter_i64 = credential.counter as i64;
    let credential_table = DB_TABLE_CREDENTIALS.as_str();

    // Plain INSERT: an existing credential id must surface as a duplicate,
    // never be overwritten.
    sqlx::query(&format!(
        r#"
        INSERT INTO {}
        (credential_id, user_id, public_key, counter, aaguid, user_verified, backed_up, device_label, created_at, last_used_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        credential_table
    ))
    .bind(&credential.credential_id)
    .bind(&credential.user_id)
    .bind(&credential.public_key)
    .bind(counter_i64)
    .bind(&credential.aaguid)
    .bind(credential.user_verified)
    .bind(credential.backed_up)
    .bind(&credential.device_label)
    .bind(credential.created_at)
    .bind(credential.last_used_at)
    .execute(pool)
    .await
    .map_err(map_unique_violation)?;

    Ok(())
}

pub(super) async fn get_credential_by_id_sqlite(
    pool: &Pool<Sqlite>,
    credential_id: &str,
) -> Result<Option<Credential>, CredentialError> {
    let credential_table = DB_TABLE_CREDENTIALS.as_str();

    sqlx::query_as::<_, Credential>(&format!(
        r#"SELECT * FROM {} WHERE credential_id = ?"#,
        credential_table
    ))
    .bind(credential_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| CredentialError::Storage(e.to_string()))
}

pub(super) async fn get_credentials_by_user_sqlite(
    pool: &Pool<Sqlite>,
    user_id: &str,
) -> Result<Vec<Credential>, CredentialError> {
    let credential_table = DB_TABLE_CREDENTIALS.as_str();

    sqlx::query_as::<_, Credential>(&format!(
        r#"SELECT * FROM {} WHERE user_id = ?"#,
        credential_table
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(|e| CredentialError::Storage(e.to_string()))
}

pub(super) async fn record_successful_use_sqlite(
    pool: &Pool<Sqlite>,
    credential_id: &str,
    counter: u32,
    used_at: DateTime<Utc>,
) -> Result<bool, CredentialError> {
    let counter_i64 = counter as i64;
    let credential_table = DB_TABLE_CREDENTIALS.as_str();

    // Conditional update: concurrent assertions race for one winner, and a
    // counter that failed to move forward matches no row. A stored counter of
    // zero means the authenticator keeps none, so the row stays updatable.
    let result = sqlx::query(&format!(
        r#"
        UPDATE {}
        SET counter = ?, last_used_at = ?
        WHERE credential_id = ? AND (counter = 0 OR counter < ?)
        "#,
        credential_table
    ))
    .bind(counter_i64)
    .bind(used_at)
    .bind(credential_id)
    .bind(counter_i64)
    .execute(pool)
    .await
    .map_err(|e| CredentialError::Storage(e.to_string()))?;

    Ok(result.rows_affected() == 1)
}

pub(super) async fn delete_credential_for_user_sqlite(
    pool: &Pool<Sqlite>,
    credential_id: &str,
    user_id: &str,
) -> Result<bool, CredentialError> {
    let credential_table = DB_TABLE_CREDENTIALS.as_str();

    let result = sqlx::query(&format!(
        r#"DELETE FROM {} WHERE credential_id = ? AND user_id = ?"#,
        credential_table
    ))
    .bind(credential_id)
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(|e| CredentialError::Storage(e.to_string()))?;

    Ok(result.rows_affected() == 1)
}
