//! Database table configuration

use std::env;
use std::sync::LazyLock;

/// Table prefix from environment variable
pub(crate) static DB_TABLE_PREFIX: LazyLock<String> =
    LazyLock::new(|| env::var("DB_TABLE_PREFIX").unwrap_or_else(|_| "pa_".to_string()));

/// Challenges table name
pub(crate) static DB_TABLE_CHALLENGES: LazyLock<String> = LazyLock::new(|| {
    env::var("DB_TABLE_CHALLENGES")
        .unwrap_or_else(|_| format!("{}{}", *DB_TABLE_PREFIX, "challenges"))
});

/// Credentials table name
pub(crate) static DB_TABLE_CREDENTIALS: LazyLock<String> = LazyLock::new(|| {
    env::var("DB_TABLE_CREDENTIALS")
        .unwrap_or_else(|_| format!("{}{}", *DB_TABLE_PREFIX, "credentials"))
});
