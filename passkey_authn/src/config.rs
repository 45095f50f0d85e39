use std::{env, sync::LazyLock};

/// Web origin the relying party is served from, e.g. `https://example.com`.
/// Assertions are only accepted when their client data carries this origin.
pub(crate) static ORIGIN: LazyLock<String> =
    LazyLock::new(|| env::var("ORIGIN").expect("ORIGIN must be set"));

/// Relying party identifier, the host component of `ORIGIN`.
pub(crate) static PASSKEY_RP_ID: LazyLock<String> = LazyLock::new(|| {
    url::Url::parse(&ORIGIN)
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()))
        .expect("Could not extract RP ID from ORIGIN")
});

/// Challenge lifetime in seconds. Past this, consume fails with Expired.
pub(crate) static PASSKEY_CHALLENGE_TIMEOUT: LazyLock<u64> = LazyLock::new(|| {
    env::var("PASSKEY_CHALLENGE_TIMEOUT")
        .map(|v| v.parse::<u64>().unwrap_or(300))
        .unwrap_or(300)
});

/// Interval in seconds between runs of the background challenge sweeper.
pub(crate) static PASSKEY_CHALLENGE_SWEEP_INTERVAL: LazyLock<u64> = LazyLock::new(|| {
    env::var("PASSKEY_CHALLENGE_SWEEP_INTERVAL")
        .map(|v| v.parse::<u64>().unwrap_or(60))
        .unwrap_or(60)
});

/// User verification policy applied when checking assertion flags.
/// Only "required" makes the UV flag mandatory.
pub(crate) static PASSKEY_USER_VERIFICATION: LazyLock<String> = LazyLock::new(|| {
    env::var("PASSKEY_USER_VERIFICATION").map_or(
        "discouraged".to_string(),
        |v| match v.to_lowercase().as_str() {
            "required" => "required".to_string(),
            "preferred" => "preferred".to_string(),
            "discouraged" => "discouraged".to_string(),
            _ => {
                tracing::warn!(
                    "Invalid user verification: {}. Using default 'discouraged'",
                    v
                );
                "discouraged".to_string()
            }
        },
    )
});
