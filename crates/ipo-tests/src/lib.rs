//! Live integration tests for the IPO Tracker API.
//!
//! These tests require the API server to be running and are ignored by
//! default; run them with `cargo test -p ipo-tests -- --ignored`.
//!
//! - `API_BASE_URL` selects the server (default: `http://localhost:8080`).
//! - `API_KEY` must hold the key of a client profile for write tests.

use ipo_client::{ClientConfig, IpoClient};
use std::time::Duration;

/// Gets the API base URL from environment or uses default.
#[must_use]
pub fn get_api_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// Gets the client API key from the environment.
#[must_use]
pub fn get_api_key() -> Option<String> {
    std::env::var("API_KEY").ok().filter(|k| !k.is_empty())
}

/// Creates a test client configured for the API, keyed if `API_KEY` is set.
///
/// # Errors
/// Returns error if client creation fails.
pub fn create_test_client() -> Result<IpoClient, ipo_client::Error> {
    IpoClient::new(ClientConfig {
        base_url: get_api_url(),
        timeout: Duration::from_secs(10),
        api_key: get_api_key(),
    })
}

/// Creates an anonymous test client.
///
/// # Errors
/// Returns error if client creation fails.
pub fn create_anonymous_client() -> Result<IpoClient, ipo_client::Error> {
    IpoClient::new(ClientConfig {
        base_url: get_api_url(),
        timeout: Duration::from_secs(10),
        api_key: None,
    })
}

/// Generates a unique name to avoid conflicts between tests.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed);

    format!("{prefix} {ts} {counter}")
}
