mod config;
mod data_store;
mod errors;
mod schema_validation;

pub async fn init() -> Result<(), errors::StorageError> {
    let _ = *data_store::GENERIC_DATA_STORE;

    Ok(())
}

pub use errors::StorageError;

pub(crate) use config::{DB_TABLE_CHALLENGES, DB_TABLE_CREDENTIALS};
pub(crate) use data_store::GENERIC_DATA_STORE;

// Re-export schema validation functions for internal use
pub(crate) use schema_validation::{validate_postgres_table_schema, validate_sqlite_table_schema};
