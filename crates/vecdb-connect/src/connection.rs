//! Connection handles.
//!
//! Every handle implements [`Connection`], so callers can list, open, create
//! and drop tables without caring which backend they talk to. The concrete
//! handle types additionally expose the configuration they were opened with.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vecdb_types::{LocalLocation, ReadConsistency, RemoteOptions, StorageOptions};

use crate::error::ConnectError;
use crate::options::{LocalConfig, RemoteConfig};
use crate::pool::{ProvisionedPool, WorkerPool};

/// Descriptor of an opened table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRef {
    pub name: String,
    pub uri: String,
    pub read_consistency: ReadConsistency,
}

/// Operations available on every open connection.
#[async_trait]
pub trait Connection: Send + Sync {
    /// The normalized location this connection points at.
    fn uri(&self) -> &str;

    /// Names of all tables, sorted.
    async fn table_names(&self) -> Result<Vec<String>, ConnectError>;

    /// Open an existing table.
    async fn open_table(&self, name: &str) -> Result<TableRef, ConnectError>;

    /// Create a new, empty table.
    async fn create_table(&self, name: &str) -> Result<TableRef, ConnectError>;

    /// Drop a table and its data.
    async fn drop_table(&self, name: &str) -> Result<(), ConnectError>;
}

/// Check a table name before it reaches storage.
///
/// Names must be non-empty and use only ASCII letters, digits, `_`, `-`
/// and `.`.
pub fn validate_table_name(name: &str) -> Result<(), ConnectError> {
    let invalid = |reason: &str| ConnectError::InvalidTableName {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    if name.is_empty() {
        return Err(invalid("table names cannot be empty"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(invalid(
            "table names can only contain alphanumeric characters, underscores, hyphens, and periods",
        ));
    }
    Ok(())
}

/// Handle to an embedded (filesystem or object-store) database.
pub struct LocalConnectionHandle {
    inner: Box<dyn Connection>,
    config: LocalConfig,
}

impl LocalConnectionHandle {
    pub(crate) fn new(config: LocalConfig, inner: Box<dyn Connection>) -> Self {
        Self { inner, config }
    }

    pub fn config(&self) -> &LocalConfig {
        &self.config
    }

    pub fn location(&self) -> &LocalLocation {
        &self.config.location
    }

    pub fn read_consistency_interval_secs(&self) -> Option<f64> {
        self.config.read_consistency_interval_secs
    }

    pub fn read_consistency(&self) -> ReadConsistency {
        self.config.read_consistency()
    }

    pub fn storage_options(&self) -> &StorageOptions {
        &self.config.storage_options
    }
}

impl fmt::Debug for LocalConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalConnectionHandle")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Handle to a managed-cloud database.
///
/// Owns its worker pool when the pool was created at connect time; the pool
/// is shut down when the handle is dropped.
pub struct RemoteConnectionHandle {
    inner: Box<dyn Connection>,
    config: RemoteConfig,
    pool: ProvisionedPool,
}

impl RemoteConnectionHandle {
    pub(crate) fn new(config: RemoteConfig, pool: ProvisionedPool, inner: Box<dyn Connection>) -> Self {
        Self {
            inner,
            config,
            pool,
        }
    }

    pub fn database(&self) -> &str {
        self.config.database()
    }

    pub fn region(&self) -> &str {
        &self.config.region
    }

    pub fn host_override(&self) -> Option<&str> {
        self.config.host_override.as_deref()
    }

    pub fn base_url(&self) -> String {
        self.config.base_url()
    }

    pub fn options(&self) -> &RemoteOptions {
        &self.config.options
    }

    pub fn worker_pool(&self) -> &Arc<WorkerPool> {
        self.pool.pool()
    }

    /// Whether dropping this handle shuts the worker pool down.
    pub fn owns_worker_pool(&self) -> bool {
        self.pool.is_owned()
    }
}

impl fmt::Debug for RemoteConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConnectionHandle")
            .field("config", &self.config)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

/// Connection returned by [`connect`](crate::connect).
#[derive(Debug)]
pub enum DbConnection {
    Local(LocalConnectionHandle),
    Remote(RemoteConnectionHandle),
}

impl DbConnection {
    pub fn is_remote(&self) -> bool {
        matches!(self, DbConnection::Remote(_))
    }

    pub fn as_local(&self) -> Option<&LocalConnectionHandle> {
        match self {
            DbConnection::Local(local) => Some(local),
            DbConnection::Remote(_) => None,
        }
    }

    pub fn as_remote(&self) -> Option<&RemoteConnectionHandle> {
        match self {
            DbConnection::Remote(remote) => Some(remote),
            DbConnection::Local(_) => None,
        }
    }

    fn inner(&self) -> &dyn Connection {
        match self {
            DbConnection::Local(local) => local.inner.as_ref(),
            DbConnection::Remote(remote) => remote.inner.as_ref(),
        }
    }
}

/// Connection returned by [`connect_async`](crate::connect_async).
pub struct AsyncConnection {
    inner: Box<dyn Connection>,
    location: LocalLocation,
    read_consistency_interval_secs: Option<f64>,
}

impl AsyncConnection {
    pub(crate) fn new(
        location: LocalLocation,
        read_consistency_interval_secs: Option<f64>,
        inner: Box<dyn Connection>,
    ) -> Self {
        Self {
            inner,
            location,
            read_consistency_interval_secs,
        }
    }

    pub fn location(&self) -> &LocalLocation {
        &self.location
    }

    pub fn read_consistency_interval_secs(&self) -> Option<f64> {
        self.read_consistency_interval_secs
    }

    pub fn read_consistency(&self) -> ReadConsistency {
        ReadConsistency::from_engine_seconds(self.read_consistency_interval_secs)
    }
}

impl fmt::Debug for AsyncConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncConnection")
            .field("location", &self.location)
            .field(
                "read_consistency_interval_secs",
                &self.read_consistency_interval_secs,
            )
            .finish_non_exhaustive()
    }
}

macro_rules! delegate_connection {
    ($ty:ty, |$this:ident| $inner:expr) => {
        #[async_trait]
        impl Connection for $ty {
            fn uri(&self) -> &str {
                let $this = self;
                $inner.uri()
            }

            async fn table_names(&self) -> Result<Vec<String>, ConnectError> {
                let $this = self;
                $inner.table_names().await
            }

            async fn open_table(&self, name: &str) -> Result<TableRef, ConnectError> {
                let $this = self;
                $inner.open_table(name).await
            }

            async fn create_table(&self, name: &str) -> Result<TableRef, ConnectError> {
                let $this = self;
                $inner.create_table(name).await
            }

            async fn drop_table(&self, name: &str) -> Result<(), ConnectError> {
                let $this = self;
                $inner.drop_table(name).await
            }
        }
    };
}

delegate_connection!(LocalConnectionHandle, |this| this.inner);
delegate_connection!(RemoteConnectionHandle, |this| this.inner);
delegate_connection!(DbConnection, |this| this.inner());
delegate_connection!(AsyncConnection, |this| this.inner);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_table_names() {
        for name in ["vectors", "my_table", "v2.embeddings", "a-b", "T1"] {
            assert!(validate_table_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_table_names() {
        for name in ["", "has space", "slash/name", "über", "semi;colon"] {
            assert!(
                matches!(
                    validate_table_name(name),
                    Err(ConnectError::InvalidTableName { .. })
                ),
                "{name:?} should be rejected"
            );
        }
    }
}
