//! Shared test initialization
//!
//! Centralized setup used by tests across the crate so every test sees the
//! same environment configuration and initialized stores.

use std::sync::Once;

/// Loads the test environment and initializes the backing stores
///
/// Environment variables come from `.env_test` (with a fallback to `.env`)
/// the first time any test calls this. Store initialization is idempotent,
/// so calling this from every test is cheap.
pub(crate) async fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }
    });

    // Initialize stores, log errors but don't panic in tests
    if let Err(e) = crate::storage::init().await {
        eprintln!("Warning: failed to initialize data store: {e}");
    }
    if let Err(e) = crate::challenge::init().await {
        eprintln!("Warning: failed to initialize challenge store: {e}");
    }
    if let Err(e) = crate::credential::init().await {
        eprintln!("Warning: failed to initialize credential store: {e}");
    }
}
