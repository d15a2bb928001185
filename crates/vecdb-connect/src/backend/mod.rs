//! Backend constructors.
//!
//! The router never talks to storage or the network itself. It resolves a
//! configuration and hands it to one of these constructors:
//! - [`LocalBackend`]: embedded databases opened by [`connect`](crate::connect)
//! - [`RemoteBackend`]: managed-cloud databases opened by [`connect`](crate::connect)
//! - [`AsyncConnector`]: embedded databases opened by [`connect_async`](crate::connect_async)
//!
//! Errors returned by a constructor reach the caller unchanged.

mod embedded;
mod recording;
mod rest;

pub use embedded::{EmbeddedBackend, EmbeddedDatabase, STORAGE_OPTION_KEYS, TABLE_SUFFIX};
pub use recording::{InMemoryDatabase, RecordedCall, RecordingBackend};
pub use rest::{RestBackend, RestDatabase};

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use vecdb_types::StorageOptions;

use crate::connection::Connection;
use crate::error::ConnectError;
use crate::options::{LocalConfig, RemoteConfig};
use crate::pool::WorkerPool;

/// Opens embedded databases for the synchronous entry point.
pub trait LocalBackend: Send + Sync {
    fn construct(&self, config: &LocalConfig) -> Result<Box<dyn Connection>, ConnectError>;
}

/// Opens managed-cloud databases.
///
/// `pool` is the connection's worker pool; requests should be dispatched on
/// it. The backend may keep a clone but must not shut it down.
pub trait RemoteBackend: Send + Sync {
    fn construct(
        &self,
        config: &RemoteConfig,
        pool: Arc<WorkerPool>,
    ) -> Result<Box<dyn Connection>, ConnectError>;
}

/// Everything the native asynchronous connector receives.
#[derive(Debug)]
pub struct NativeConnectRequest {
    pub uri: String,
    pub api_key: Option<SecretString>,
    pub region: String,
    pub host_override: Option<String>,
    pub read_consistency_interval_secs: Option<f64>,
    pub storage_options: Option<StorageOptions>,
}

/// Native asynchronous connector used by the async entry point.
#[async_trait]
pub trait AsyncConnector: Send + Sync {
    async fn connect(&self, request: NativeConnectRequest)
        -> Result<Box<dyn Connection>, ConnectError>;
}
