//! End-to-end test infrastructure for vecdb.
//!
//! Provides a shared TestHarness and helper functions for E2E tests
//! covering location routing, the embedded store and the managed-cloud client.

use std::path::PathBuf;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vecdb_connect::{MapEnv, RecordingBackend, Router, UriNormalizer, API_KEY_ENV};

/// Shared test harness for E2E tests.
///
/// Provides a fake home and working directory inside a temp dir, so location
/// normalization never depends on the machine running the tests.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Directory `~` expands to
    pub home: PathBuf,
    /// Directory relative locations resolve against
    pub cwd: PathBuf,
    /// Records calls made by routers from [`TestHarness::recording_router`]
    pub backend: RecordingBackend,
}

impl TestHarness {
    /// Create a new test harness with temp home and working directories.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let home = temp_dir.path().join("home");
        let cwd = temp_dir.path().join("work");

        std::fs::create_dir_all(&home).expect("Failed to create home dir");
        std::fs::create_dir_all(&cwd).expect("Failed to create work dir");

        Self {
            _temp_dir: temp_dir,
            home,
            cwd,
            backend: RecordingBackend::new(),
        }
    }

    pub fn normalizer(&self) -> UriNormalizer {
        UriNormalizer::new(Some(self.home.clone()), Some(self.cwd.clone()))
    }

    /// Router whose backends only record what they were asked to open.
    pub fn recording_router(&self, env: MapEnv) -> Router {
        Router::new()
            .with_env(env)
            .with_normalizer(self.normalizer())
            .with_local_backend(self.backend.clone())
            .with_remote_backend(self.backend.clone())
            .with_async_connector(self.backend.clone())
    }

    /// Router using the real embedded and REST backends.
    pub fn router(&self, env: MapEnv) -> Router {
        Router::new().with_env(env).with_normalizer(self.normalizer())
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Environment with only the API key variable set.
pub fn env_with_api_key(key: &str) -> MapEnv {
    MapEnv::new().with(API_KEY_ENV, key)
}

/// Start a mock managed-cloud service for `database`.
///
/// Lists `tables`, accepts create/describe/drop for each of them, and answers
/// 404 for describe on anything else. Every mounted route requires `api_key`.
pub async fn mock_service(database: &str, api_key: &str, tables: &[&str]) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/table/"))
        .and(header("x-api-key", api_key))
        .and(header("x-lancedb-database", database))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tables": tables })))
        .mount(&server)
        .await;

    for table in tables {
        for action in ["create", "describe", "drop"] {
            Mock::given(method("POST"))
                .and(path(format!("/v1/table/{table}/{action}/")))
                .and(header("x-api-key", api_key))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
                .mount(&server)
                .await;
        }
    }

    // Lowest priority: anything not matched above is an unknown table
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("table not found"))
        .with_priority(u8::MAX)
        .mount(&server)
        .await;

    server
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_dirs_exist() {
        let harness = TestHarness::new();
        assert!(harness.home.is_dir());
        assert!(harness.cwd.is_dir());
        assert_eq!(
            harness.normalizer().normalize("~/db"),
            harness.home.join("db").to_string_lossy()
        );
    }
}
