use chrono::{DateTime, Utc};

use crate::credential::errors::CredentialError;
use crate::credential::types::Credential;
use crate::storage::GENERIC_DATA_STORE;

use super::postgres::{
    create_credential_tables_postgres, delete_credential_for_user_postgres,
    get_credential_by_id_postgres, get_credentials_by_user_postgres, insert_credential_postgres,
    record_successful_use_postgres, validate_credential_tables_postgres,
};
use super::sqlite::{
    create_credential_tables_sqlite, delete_credential_for_user_sqlite,
    get_credential_by_id_sqlite, get_credentials_by_user_sqlite, insert_credential_sqlite,
    record_successful_use_sqlite, validate_credential_tables_sqlite,
};

pub(crate) struct CredentialStore;

impl CredentialStore {
    pub(crate) async fn init() -> Result<(), CredentialError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            create_credential_tables_sqlite(pool).await?;
            validate_credential_tables_sqlite(pool).await
        } else if let Some(pool) = store.as_postgres() {
            create_credential_tables_postgres(pool).await?;
            validate_credential_tables_postgres(pool).await
        } else {
            Err(CredentialError::Storage("Unsupported database type".into()))
        }
    }

    /// Insert a new credential row. The primary key constraint enforces
    /// global credential id uniqueness; violations come back as `Duplicate`.
    pub(crate) async fn insert_credential(credential: &Credential) -> Result<(), CredentialError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            insert_credential_sqlite(pool, credential).await
        } else if let Some(pool) = store.as_postgres() {
            insert_credential_postgres(pool, credential).await
        } else {
            Err(CredentialError::Storage("Unsupported database type".into()))
        }
    }

    pub(crate) async fn get_credential_by_id(
        credential_id: &str,
    ) -> Result<Option<Credential>, CredentialError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_credential_by_id_sqlite(pool, credential_id).await
        } else if let Some(pool) = store.as_postgres() {
            get_credential_by_id_postgres(pool, credential_id).await
        } else {
            Err(CredentialError::Storage("Unsupported database type".into()))
        }
    }

    pub(crate) async fn get_credentials_by_user(
        user_id: &str,
    ) -> Result<Vec<Credential>, CredentialError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_credentials_by_user_sqlite(pool, user_id).await
        } else if let Some(pool) = store.as_postgres() {
            get_credentials_by_user_postgres(pool, user_id).await
        } else {
            Err(CredentialError::Storage("Unsupported database type".into()))
        }
    }

    /// Advance the counter and last-used timestamp. Returns whether a row was
    /// updated; false means the counter guard rejected the write or the
    /// credential no longer exists.
    pub(crate) async fn record_successful_use(
        credential_id: &str,
        counter: u32,
        used_at: DateTime<Utc>,
    ) -> Result<bool, CredentialError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            record_successful_use_sqlite(pool, credential_id, counter, used_at).await
        } else if let Some(pool) = store.as_postgres() {
            record_successful_use_postgres(pool, credential_id, counter, used_at).await
        } else {
            Err(CredentialError::Storage("Unsupported database type".into()))
        }
    }

    /// Delete a credential owned by the given user. Returns whether a row was
    /// deleted; false means the credential is absent or owned by someone else.
    pub(crate) async fn delete_credential_for_user(
        credential_id: &str,
        user_id: &str,
    ) -> Result<bool, CredentialError> {
        let store = GENERIC_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            delete_credential_for_user_sqlite(pool, credential_id, user_id).await
        } else if let Some(pool) = store.as_postgres() {
            delete_credential_for_user_postgres(pool, credential_id, user_id).await
        } else {
            Err(CredentialError::Storage("Unsupported database type".into()))
        }
    }
}

pub(super) fn map_unique_violation(e: sqlx::Error) -> CredentialError {
    match e.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => CredentialError::Duplicate,
        _ => CredentialError::Storage(e.to_string()),
    }
}

use sqlx::{FromRow, Row, postgres::PgRow, sqlite::SqliteRow};

// Implement FromRow for Credential to map the flat database row for SQLite
impl<'r> FromRow<'r, SqliteRow> for Credential {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let credential_id: String = row.try_get("credential_id")?;
        let user_id: String = row.try_get("user_id")?;
        let public_key: String = row.try_get("public_key")?;
        let counter: i64 = row.try_get("counter")?;
        let aaguid: Option<String> = row.try_get("aaguid")?;
        let user_verified: bool = row.try_get("user_verified")?;
        let backed_up: bool = row.try_get("backed_up")?;
        let device_label: String = row.try_get("device_label")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let last_used_at: DateTime<Utc> = row.try_get("last_used_at")?;

        Ok(Credential {
            credential_id,
            user_id,
            public_key,
            counter: counter as u32,
            aaguid,
            user_verified,
            backed_up,
            device_label,
            created_at,
            last_used_at,
        })
    }
}

// Implement FromRow for Credential to map the flat database row for PostgreSQL
impl<'r> FromRow<'r, PgRow> for Credential {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let credential_id: String = row.try_get("credential_id")?;
        let user_id: String = row.try_get("user_id")?;
        let public_key: String = row.try_get("public_key")?;
        let counter: i64 = row.try_get("counter")?;
        let aaguid: Option<String> = row.try_get("aaguid")?;
        let user_verified: bool = row.try_get("user_verified")?;
        let backed_up: bool = row.try_get("backed_up")?;
        let device_label: String = row.try_get("device_label")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        let last_used_at: DateTime<Utc> = row.try_get("last_used_at")?;

        Ok(Credential {
            credential_id,
            user_id,
            public_key,
            counter: counter as u32,
            aaguid,
            user_verified,
            backed_up,
            device_label,
            created_at,
            last_used_at,
        })
    }
}
