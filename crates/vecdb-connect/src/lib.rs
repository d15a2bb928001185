//! # vecdb-connect
//!
//! Connection layer for embedded and managed-cloud vector databases.
//!
//! Provides:
//! - Location normalization (`~`, relative paths, scheme pass-through)
//! - API key resolution from an explicit value or `LANCEDB_API_KEY`
//! - Read-consistency interval conversion
//! - Worker pool provisioning for managed-cloud connections
//! - The [`Router`] and the [`connect`] / [`connect_async`] entry points
//! - Default backends: an embedded directory store and a REST client
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vecdb_connect::{connect, Connection, ConnectOptions};
//!
//! # async fn run() -> Result<(), vecdb_connect::ConnectError> {
//! let db = connect("~/.lancedb", ConnectOptions::new())?;
//! for name in db.table_names().await? {
//!     println!("{name}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod connection;
pub mod credential;
pub mod duration;
pub mod error;
pub mod normalize;
pub mod options;
pub mod pool;
pub mod router;

pub use backend::{
    AsyncConnector, EmbeddedBackend, InMemoryDatabase, LocalBackend, NativeConnectRequest,
    RecordedCall, RecordingBackend, RemoteBackend, RestBackend,
};
pub use connection::{
    validate_table_name, AsyncConnection, Connection, DbConnection, LocalConnectionHandle,
    RemoteConnectionHandle, TableRef,
};
pub use credential::{resolve_api_key, EnvSource, MapEnv, ProcessEnv, API_KEY_ENV};
pub use duration::to_engine_seconds;
pub use error::ConnectError;
pub use normalize::{normalize_uri, UriNormalizer};
pub use options::{
    AsyncConnectOptions, ConnectOptions, ConnectionConfig, LocalConfig, RemoteConfig,
};
pub use pool::{default_worker_count, provision, PoolSpec, ProvisionedPool, WorkerPool};
pub use router::{connect, connect_async, Router};
