//! Common test utilities for integration tests.

#![allow(dead_code)]

use heroku_client::{GitHubClient, HerokuClient, ManualClock};
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

pub const APP_ID: &str = "01234567-89ab-cdef-0123-456789abcdef";
pub const BUILD_ID: &str = "01234567-89ab-cdef-0123-456789abcde0";

/// Heroku client pointed at mock servers, with virtual time.
pub fn test_client(heroku: &MockServer, github: &MockServer) -> (HerokuClient, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let client = HerokuClient::with_api_key("test-api-key", heroku.uri(), Duration::from_secs(5))
        .unwrap()
        .with_github(GitHubClient::with_base_url(github.uri(), Duration::from_secs(5)).unwrap())
        .with_clock(clock.clone());
    (client, clock)
}

pub fn build_json(status: &str, url: &str, version: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "id": BUILD_ID,
        "app": {"id": APP_ID},
        "status": status,
        "source_blob": {
            "url": url,
            "version": version,
            "checksum": null,
            "version_description": null
        },
        "output_stream_url": "https://build-output.heroku.com/streams/01/01234567",
        "created_at": "2024-01-01T00:00:00Z",
        "buildpacks": null
    })
}

pub fn build_path() -> String {
    format!("/apps/{APP_ID}/builds/{BUILD_ID}")
}

/// Route `tracing` output to the test harness, once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
