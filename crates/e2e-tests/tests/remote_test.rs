//! Managed-cloud E2E tests for vecdb.
//!
//! Connects through the router and the REST backend to a mock service and
//! checks credentials, endpoints and error mapping on the wire.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use e2e_tests::{env_with_api_key, mock_service, TestHarness};
use vecdb_connect::{ConnectError, ConnectOptions, Connection, MapEnv, WorkerPool};
use vecdb_types::ReadConsistency;

#[tokio::test]
async fn test_remote_table_lifecycle() {
    let server = mock_service("mydb", "ldb_x", &["vectors", "images"]).await;
    let harness = TestHarness::new();

    let db = harness
        .router(MapEnv::new())
        .connect(
            "db://mydb",
            ConnectOptions::new()
                .api_key("ldb_x")
                .host_override(server.uri())
                .request_thread_pool(2),
        )
        .unwrap();

    assert_eq!(db.table_names().await.unwrap(), vec!["images", "vectors"]);

    let table = db.open_table("vectors").await.unwrap();
    assert_eq!(table.uri, "db://mydb/vectors");
    assert_eq!(table.read_consistency, ReadConsistency::Strong);

    db.create_table("images").await.unwrap();
    db.drop_table("images").await.unwrap();
}

/// The key from the environment is what reaches the service.
#[tokio::test]
async fn test_remote_env_key_on_the_wire() {
    let server = mock_service("mydb", "ldb_env", &["t"]).await;
    let harness = TestHarness::new();

    let db = harness
        .router(env_with_api_key("ldb_env"))
        .connect(
            "db://mydb",
            ConnectOptions::new().host_override(server.uri()),
        )
        .unwrap();
    assert_eq!(db.table_names().await.unwrap(), vec!["t"]);
}

#[tokio::test]
async fn test_remote_unknown_table() {
    let server = mock_service("mydb", "k", &["known"]).await;
    let harness = TestHarness::new();

    let db = harness
        .router(MapEnv::new())
        .connect(
            "db://mydb",
            ConnectOptions::new().api_key("k").host_override(server.uri()),
        )
        .unwrap();
    assert!(matches!(
        db.open_table("unknown").await,
        Err(ConnectError::TableNotFound(_))
    ));
}

#[tokio::test]
async fn test_remote_server_error() {
    let server = wiremock::MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/table/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;
    let harness = TestHarness::new();

    let db = harness
        .router(MapEnv::new())
        .connect(
            "db://mydb",
            ConnectOptions::new().api_key("k").host_override(server.uri()),
        )
        .unwrap();
    match db.table_names().await {
        Err(ConnectError::Http { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("Expected Http error, got {other:?}"),
    }
}

/// Requests keep working on a shared pool after another connection using it
/// is dropped.
#[tokio::test]
async fn test_shared_pool_survives_connection_drop() {
    let server = mock_service("mydb", "k", &["t"]).await;
    let harness = TestHarness::new();
    let router = harness.router(env_with_api_key("k"));
    let pool = Arc::new(WorkerPool::new(2).unwrap());

    let options = || {
        ConnectOptions::new()
            .host_override(server.uri())
            .request_thread_pool(Arc::clone(&pool))
    };
    let first = router.connect("db://mydb", options()).unwrap();
    let second = router.connect("db://mydb", options()).unwrap();

    assert_eq!(first.table_names().await.unwrap(), vec!["t"]);
    drop(first);
    assert!(!pool.is_shutdown());
    assert_eq!(second.table_names().await.unwrap(), vec!["t"]);
}

/// A caller pool that was already shut down is reported by the backend.
#[test]
fn test_shut_down_pool_rejected_by_backend() {
    let harness = TestHarness::new();
    let pool = Arc::new(WorkerPool::new(1).unwrap());
    pool.shutdown();

    let result = harness.router(env_with_api_key("k")).connect(
        "db://mydb",
        ConnectOptions::new().request_thread_pool(pool),
    );
    assert!(matches!(
        result,
        Err(ConnectError::BackendConstruction(_))
    ));
}

/// A connection opened with its own pool stops it when dropped.
#[tokio::test]
async fn test_owned_pool_stops_with_connection() {
    let server = mock_service("mydb", "k", &["t"]).await;
    let harness = TestHarness::new();

    let db = harness
        .router(env_with_api_key("k"))
        .connect(
            "db://mydb",
            ConnectOptions::new()
                .host_override(server.uri())
                .request_thread_pool(1),
        )
        .unwrap();
    assert_eq!(db.table_names().await.unwrap(), vec!["t"]);

    let pool = Arc::clone(db.as_remote().unwrap().worker_pool());
    drop(db);
    assert!(pool.is_shutdown());
    assert!(matches!(pool.spawn(async {}), Err(ConnectError::PoolShutdown)));
}
