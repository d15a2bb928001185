//! Connection routing.
//!
//! A [`Router`] turns a location string plus caller options into an open
//! connection:
//!
//! 1. Normalize the location and classify it as managed-cloud (`db://`) or
//!    embedded.
//! 2. Managed-cloud: resolve the API key, validate the remote option set,
//!    provision the worker pool. Embedded: convert the read-consistency
//!    interval and merge extra options into the storage options.
//! 3. Hand the resolved [`ConnectionConfig`] to the matching backend and wrap
//!    the session it returns.
//!
//! Every configuration error is raised before any backend is called. Backend
//! errors are returned unchanged and nothing is retried.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};
use vecdb_types::{LocalLocation, Location, RemoteLocation, RemoteOptions, DEFAULT_REGION};

use crate::backend::{
    AsyncConnector, EmbeddedBackend, LocalBackend, NativeConnectRequest, RemoteBackend,
    RestBackend,
};
use crate::connection::{AsyncConnection, DbConnection, LocalConnectionHandle, RemoteConnectionHandle};
use crate::credential::{resolve_api_key, EnvSource, ProcessEnv};
use crate::duration::to_engine_seconds;
use crate::error::ConnectError;
use crate::normalize::UriNormalizer;
use crate::options::{
    AsyncConnectOptions, ConnectOptions, ConnectionConfig, LocalConfig, RemoteConfig,
};
use crate::pool::provision;

/// Routes connect requests to the embedded or managed-cloud backend.
#[derive(Clone)]
pub struct Router {
    env: Arc<dyn EnvSource>,
    normalizer: UriNormalizer,
    local: Arc<dyn LocalBackend>,
    remote: Arc<dyn RemoteBackend>,
    native: Arc<dyn AsyncConnector>,
}

impl Default for Router {
    /// Process environment, process home/working directory, and the
    /// embedded and REST backends.
    fn default() -> Self {
        Self {
            env: Arc::new(ProcessEnv),
            normalizer: UriNormalizer::from_process(),
            local: Arc::new(EmbeddedBackend::new()),
            remote: Arc::new(RestBackend::new()),
            native: Arc::new(EmbeddedBackend::new()),
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("normalizer", &self.normalizer)
            .finish_non_exhaustive()
    }
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    pub fn with_normalizer(mut self, normalizer: UriNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_local_backend(mut self, backend: impl LocalBackend + 'static) -> Self {
        self.local = Arc::new(backend);
        self
    }

    pub fn with_remote_backend(mut self, backend: impl RemoteBackend + 'static) -> Self {
        self.remote = Arc::new(backend);
        self
    }

    pub fn with_async_connector(mut self, connector: impl AsyncConnector + 'static) -> Self {
        self.native = Arc::new(connector);
        self
    }

    /// Resolve `location` and `options` into a connection configuration
    /// without calling any backend.
    ///
    /// For managed-cloud locations this provisions the worker pool; dropping
    /// the returned configuration releases an owned pool again.
    ///
    /// # Errors
    ///
    /// - `MissingCredential` for a `db://` location with no API key
    /// - `InvalidConfig` for unknown or malformed remote options, a zero
    ///   worker count, or a negative read-consistency interval
    pub fn configure(
        &self,
        location: impl AsRef<Path>,
        options: ConnectOptions,
    ) -> Result<ConnectionConfig, ConnectError> {
        let uri = self.normalizer.normalize(location);
        match Location::classify(uri) {
            Location::Remote(location) => self.configure_remote(location, options),
            Location::Local(location) => self.configure_local(location, options),
        }
    }

    fn configure_remote(
        &self,
        location: RemoteLocation,
        options: ConnectOptions,
    ) -> Result<ConnectionConfig, ConnectError> {
        let ConnectOptions {
            api_key,
            region,
            host_override,
            read_consistency_interval,
            request_thread_pool,
            storage_options,
            extra_options,
        } = options;

        let api_key = resolve_api_key(api_key, self.env.as_ref(), location.uri())?;
        let remote_options = RemoteOptions::from_extra(&extra_options)?;
        if read_consistency_interval.is_some() || !storage_options.is_empty() {
            debug!(
                uri = location.uri(),
                "Ignoring embedded-only parameters for managed-cloud location"
            );
        }
        let pool = provision(request_thread_pool)?;

        Ok(ConnectionConfig::Remote(
            RemoteConfig {
                location,
                api_key,
                region,
                host_override,
                options: remote_options,
            },
            pool,
        ))
    }

    fn configure_local(
        &self,
        location: LocalLocation,
        options: ConnectOptions,
    ) -> Result<ConnectionConfig, ConnectError> {
        let ConnectOptions {
            api_key,
            region,
            host_override,
            read_consistency_interval,
            request_thread_pool,
            mut storage_options,
            extra_options,
        } = options;

        let read_consistency_interval_secs = to_engine_seconds(read_consistency_interval)?;
        if api_key.is_some()
            || host_override.is_some()
            || request_thread_pool.is_some()
            || region != DEFAULT_REGION
        {
            debug!(
                uri = location.uri(),
                "Ignoring managed-cloud parameters for embedded location"
            );
        }
        storage_options.merge(&extra_options);

        Ok(ConnectionConfig::Local(LocalConfig {
            location,
            read_consistency_interval_secs,
            storage_options,
        }))
    }

    /// Open a connection to `location`.
    ///
    /// `db://` locations open a managed-cloud connection; every other
    /// location opens an embedded database.
    ///
    /// # Errors
    ///
    /// Everything [`configure`](Self::configure) reports, plus whatever the
    /// backend constructor returns, unchanged. An owned worker pool is shut
    /// down before the error is returned.
    pub fn connect(
        &self,
        location: impl AsRef<Path>,
        options: ConnectOptions,
    ) -> Result<DbConnection, ConnectError> {
        match self.configure(location, options)? {
            ConnectionConfig::Local(config) => {
                let inner = self.local.construct(&config)?;
                info!(
                    uri = config.uri(),
                    read_consistency_interval_secs = ?config.read_consistency_interval_secs,
                    "Connected to embedded database"
                );
                Ok(DbConnection::Local(LocalConnectionHandle::new(config, inner)))
            }
            ConnectionConfig::Remote(config, pool) => {
                let inner = self.remote.construct(&config, Arc::clone(pool.pool()))?;
                info!(
                    database = config.database(),
                    region = %config.region,
                    workers = pool.workers(),
                    owned_pool = pool.is_owned(),
                    "Connected to managed-cloud database"
                );
                Ok(DbConnection::Remote(RemoteConnectionHandle::new(
                    config, pool, inner,
                )))
            }
        }
    }

    /// Open an embedded database through the native asynchronous connector.
    ///
    /// Location and interval are checked before the connector is awaited;
    /// `storage_options` are forwarded as given.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` for a `db://` location or a negative interval
    /// - whatever the connector returns, unchanged
    pub async fn connect_async(
        &self,
        location: impl AsRef<Path>,
        options: AsyncConnectOptions,
    ) -> Result<AsyncConnection, ConnectError> {
        let uri = self.normalizer.normalize(location);
        let location = match Location::classify(uri) {
            Location::Local(location) => location,
            Location::Remote(remote) => {
                return Err(ConnectError::InvalidConfig(format!(
                    "asynchronous connections support embedded databases only, got {}",
                    remote.uri()
                )))
            }
        };
        let read_consistency_interval_secs = to_engine_seconds(options.read_consistency_interval)?;

        let request = NativeConnectRequest {
            uri: location.uri().to_string(),
            api_key: options.api_key,
            region: options.region,
            host_override: options.host_override,
            read_consistency_interval_secs,
            storage_options: options.storage_options,
        };
        let inner = self.native.connect(request).await?;
        info!(uri = location.uri(), "Connected to embedded database (async)");

        Ok(AsyncConnection::new(
            location,
            read_consistency_interval_secs,
            inner,
        ))
    }
}

/// Open a connection with the default [`Router`].
pub fn connect(
    location: impl AsRef<Path>,
    options: ConnectOptions,
) -> Result<DbConnection, ConnectError> {
    Router::default().connect(location, options)
}

/// Open an embedded database asynchronously with the default [`Router`].
pub async fn connect_async(
    location: impl AsRef<Path>,
    options: AsyncConnectOptions,
) -> Result<AsyncConnection, ConnectError> {
    Router::default().connect_async(location, options).await
}
