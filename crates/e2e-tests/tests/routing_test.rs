//! Routing E2E tests for vecdb.
//!
//! Drives the router end to end with recording backends, checking which
//! backend is chosen and exactly what it receives.

use std::sync::Arc;

use chrono::Duration;
use pretty_assertions::assert_eq;

use e2e_tests::{env_with_api_key, TestHarness};
use vecdb_connect::{
    default_worker_count, AsyncConnectOptions, ConnectError, ConnectOptions, Connection,
    MapEnv, RecordedCall, WorkerPool,
};
use vecdb_types::{Location, StorageOptions};

// ===== Managed-cloud routing =====

/// db:// with no key anywhere fails before any backend is called.
#[test]
fn test_remote_without_any_key() {
    let harness = TestHarness::new();
    let router = harness.recording_router(MapEnv::new());

    let result = router.connect("db://mydb", ConnectOptions::new());
    match result {
        Err(ConnectError::MissingCredential { location }) => assert_eq!(location, "db://mydb"),
        other => panic!("Expected MissingCredential, got {other:?}"),
    }
    assert!(harness.backend.calls().is_empty());
}

/// An explicit key opens a remote handle in the default region.
#[test]
fn test_remote_with_explicit_key() {
    let harness = TestHarness::new();
    let router = harness.recording_router(MapEnv::new());

    let db = router
        .connect("db://mydb", ConnectOptions::new().api_key("ldb_x"))
        .unwrap();
    let remote = db.as_remote().expect("Expected remote handle");
    assert_eq!(remote.region(), "us-east-1");
    assert_eq!(remote.base_url(), "https://mydb.us-east-1.api.lancedb.com");
    assert_eq!(
        harness.backend.calls(),
        vec![RecordedCall::Remote {
            uri: "db://mydb".to_string(),
            api_key: "ldb_x".to_string(),
            region: "us-east-1".to_string(),
            host_override: None,
            workers: default_worker_count(),
        }]
    );
}

/// Explicit key beats the environment; environment is used otherwise.
#[test]
fn test_credential_precedence() {
    let harness = TestHarness::new();
    let router = harness.recording_router(env_with_api_key("ldb_env"));

    router
        .connect("db://mydb", ConnectOptions::new().api_key("ldb_explicit"))
        .unwrap();
    router.connect("db://mydb", ConnectOptions::new()).unwrap();

    let keys: Vec<String> = harness
        .backend
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            RecordedCall::Remote { api_key, .. } => Some(api_key),
            _ => None,
        })
        .collect();
    assert_eq!(keys, vec!["ldb_explicit", "ldb_env"]);
}

/// Unknown remote options are rejected before any backend is called.
#[test]
fn test_remote_unknown_option() {
    let harness = TestHarness::new();
    let router = harness.recording_router(MapEnv::new());

    let result = router.connect(
        "db://mydb",
        ConnectOptions::new().api_key("k").extra_option("bogus", "1"),
    );
    match result {
        Err(ConnectError::InvalidConfig(message)) => assert!(message.contains("bogus")),
        other => panic!("Expected InvalidConfig, got {other:?}"),
    }
    assert!(harness.backend.calls().is_empty());
}

/// Bad values for known remote options are rejected too.
#[test]
fn test_remote_bad_timeout_value() {
    let harness = TestHarness::new();
    let router = harness.recording_router(MapEnv::new());

    for value in ["0", "-3", "soon"] {
        let result = router.connect(
            "db://mydb",
            ConnectOptions::new()
                .api_key("k")
                .extra_option("connection_timeout", value),
        );
        assert!(
            matches!(result, Err(ConnectError::InvalidConfig(_))),
            "connection_timeout={value} should be rejected"
        );
    }
    assert!(harness.backend.calls().is_empty());
}

/// Worker pool ownership follows how the pool was specified.
#[test]
fn test_pool_ownership() {
    let harness = TestHarness::new();
    let router = harness.recording_router(env_with_api_key("k"));

    let db = router
        .connect("db://mydb", ConnectOptions::new().request_thread_pool(4))
        .unwrap();
    let remote = db.as_remote().unwrap();
    assert!(remote.owns_worker_pool());
    assert_eq!(remote.worker_pool().workers(), 4);
    let owned = Arc::clone(remote.worker_pool());
    drop(db);
    assert!(owned.is_shutdown());

    let shared = Arc::new(WorkerPool::new(2).unwrap());
    let first = router
        .connect(
            "db://mydb",
            ConnectOptions::new().request_thread_pool(Arc::clone(&shared)),
        )
        .unwrap();
    let second = router
        .connect(
            "db://other",
            ConnectOptions::new().request_thread_pool(Arc::clone(&shared)),
        )
        .unwrap();
    drop(first);
    assert!(!shared.is_shutdown());
    assert!(Arc::ptr_eq(second.as_remote().unwrap().worker_pool(), &shared));
    drop(second);
    assert!(!shared.is_shutdown());

    let result = router.connect("db://mydb", ConnectOptions::new().request_thread_pool(0));
    assert!(matches!(result, Err(ConnectError::InvalidConfig(_))));
}

// ===== Embedded routing =====

/// A home-relative path opens an embedded handle with no consistency checks.
#[test]
fn test_home_path_embedded() {
    let harness = TestHarness::new();
    let router = harness.recording_router(MapEnv::new());

    let db = router.connect("~/.lancedb", ConnectOptions::new()).unwrap();
    let local = db.as_local().expect("Expected local handle");
    assert_eq!(
        local.location().uri(),
        harness.home.join(".lancedb").to_string_lossy()
    );
    assert_eq!(local.read_consistency_interval_secs(), None);
}

/// An object-store location with a zero interval checks before every read.
#[test]
fn test_object_store_strong_consistency() {
    let harness = TestHarness::new();
    let router = harness.recording_router(MapEnv::new());

    let db = router
        .connect(
            "s3://bucket/db",
            ConnectOptions::new().read_consistency_interval(Duration::zero()),
        )
        .unwrap();
    assert_eq!(
        harness.backend.calls(),
        vec![RecordedCall::Local {
            uri: "s3://bucket/db".to_string(),
            read_consistency_interval_secs: Some(0.0),
            storage_options: StorageOptions::default(),
        }]
    );
    assert_eq!(db.uri(), "s3://bucket/db");
}

/// Remote-only parameters do not disturb an embedded connect.
#[test]
fn test_embedded_ignores_remote_parameters() {
    let harness = TestHarness::new();
    let router = harness.recording_router(MapEnv::new());

    let db = router
        .connect(
            "relative/db",
            ConnectOptions::new()
                .api_key("unused")
                .region("eu-west-1")
                .host_override("http://unused")
                .request_thread_pool(0)
                .read_consistency_interval(Duration::seconds(5)),
        )
        .unwrap();
    let local = db.as_local().unwrap();
    assert_eq!(local.location().uri(), harness.cwd.join("relative/db").to_string_lossy());
    assert_eq!(local.read_consistency_interval_secs(), Some(5.0));
}

/// Every location without the db:// prefix is embedded.
#[test]
fn test_classification_is_prefix_only() {
    for uri in [
        "/abs/path",
        "rel",
        "s3://b/d",
        "gs://b/d",
        "az://c/d",
        "file:///x",
        "memory://",
        "DB://upper",
        "db:/one-slash",
        "xdb://mydb",
    ] {
        assert!(!Location::classify(uri).is_remote(), "{uri} should be embedded");
    }
    for uri in ["db://mydb", "db://", "db://a/b"] {
        assert!(Location::classify(uri).is_remote(), "{uri} should be remote");
    }
}

// ===== Async entry point =====

/// The async entry point forwards storage options verbatim.
#[tokio::test]
async fn test_async_forwards_storage_options() {
    let harness = TestHarness::new();
    let router = harness.recording_router(MapEnv::new());
    let storage = StorageOptions::new().with("not_validated_here", "1");

    let db = router
        .connect_async(
            "gs://bucket/db",
            AsyncConnectOptions::new().storage_options(storage.clone()),
        )
        .await
        .unwrap();
    assert_eq!(db.location().uri(), "gs://bucket/db");
    assert_eq!(
        harness.backend.calls(),
        vec![RecordedCall::Native {
            uri: "gs://bucket/db".to_string(),
            api_key: None,
            region: "us-east-1".to_string(),
            host_override: None,
            read_consistency_interval_secs: None,
            storage_options: Some(storage),
        }]
    );
}

/// Configuration errors surface from the async entry point without calling
/// the connector.
#[tokio::test]
async fn test_async_config_errors() {
    let harness = TestHarness::new();
    let router = harness.recording_router(MapEnv::new());

    let remote = router
        .connect_async("db://mydb", AsyncConnectOptions::new())
        .await;
    assert!(matches!(remote, Err(ConnectError::InvalidConfig(_))));

    let negative = router
        .connect_async(
            "/data/db",
            AsyncConnectOptions::new().read_consistency_interval(Duration::seconds(-1)),
        )
        .await;
    assert!(matches!(negative, Err(ConnectError::InvalidConfig(_))));

    assert!(harness.backend.calls().is_empty());
}
