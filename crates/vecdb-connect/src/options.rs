//! Caller-facing connect options and the resolved per-variant configuration.

use std::collections::BTreeMap;

use secrecy::SecretString;
use vecdb_types::{
    LocalLocation, ReadConsistency, RemoteLocation, RemoteOptions, Settings, StorageOptions,
    DEFAULT_REGION,
};

use crate::error::ConnectError;
use crate::pool::{PoolSpec, ProvisionedPool};

/// Parameters accepted by [`connect`](crate::connect).
///
/// Embedded locations use `read_consistency_interval`, `storage_options` and
/// `extra_options`; managed-cloud locations use the API key, region, host
/// override, request thread pool and `extra_options`. Parameters that do not
/// apply to the selected location are ignored.
#[derive(Debug)]
pub struct ConnectOptions {
    pub api_key: Option<SecretString>,
    pub region: String,
    pub host_override: Option<String>,
    pub read_consistency_interval: Option<chrono::Duration>,
    pub request_thread_pool: Option<PoolSpec>,
    pub storage_options: StorageOptions,
    /// Remote: closed set of client options. Embedded: merged into storage
    /// options and checked by the storage backend.
    pub extra_options: BTreeMap<String, String>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            region: DEFAULT_REGION.to_string(),
            host_override: None,
            read_consistency_interval: None,
            request_thread_pool: None,
            storage_options: StorageOptions::default(),
            extra_options: BTreeMap::new(),
        }
    }
}

impl ConnectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options seeded from loaded settings.
    ///
    /// Fails with `InvalidConfig` when the configured read-consistency
    /// interval is not a finite number of seconds.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConnectError> {
        Ok(Self {
            region: settings.region.clone(),
            host_override: settings.host_override.clone(),
            read_consistency_interval: settings.read_consistency_interval()?,
            request_thread_pool: settings.request_threads.map(PoolSpec::WorkerCount),
            ..Self::default()
        })
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn host_override(mut self, host: impl Into<String>) -> Self {
        self.host_override = Some(host.into());
        self
    }

    pub fn read_consistency_interval(mut self, interval: chrono::Duration) -> Self {
        self.read_consistency_interval = Some(interval);
        self
    }

    pub fn request_thread_pool(mut self, spec: impl Into<PoolSpec>) -> Self {
        self.request_thread_pool = Some(spec.into());
        self
    }

    pub fn storage_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.storage_options.insert(key, value);
        self
    }

    pub fn extra_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_options.insert(key.into(), value.into());
        self
    }
}

/// Parameters accepted by [`connect_async`](crate::connect_async).
#[derive(Debug)]
pub struct AsyncConnectOptions {
    pub api_key: Option<SecretString>,
    pub region: String,
    pub host_override: Option<String>,
    pub read_consistency_interval: Option<chrono::Duration>,
    /// Forwarded verbatim to the native connector
    pub storage_options: Option<StorageOptions>,
}

impl Default for AsyncConnectOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            region: DEFAULT_REGION.to_string(),
            host_override: None,
            read_consistency_interval: None,
            storage_options: None,
        }
    }
}

impl AsyncConnectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(api_key.into()));
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn host_override(mut self, host: impl Into<String>) -> Self {
        self.host_override = Some(host.into());
        self
    }

    pub fn read_consistency_interval(mut self, interval: chrono::Duration) -> Self {
        self.read_consistency_interval = Some(interval);
        self
    }

    pub fn storage_options(mut self, options: StorageOptions) -> Self {
        self.storage_options = Some(options);
        self
    }
}

/// Resolved configuration for an embedded connection.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalConfig {
    pub location: LocalLocation,
    /// Engine-facing interval; `None` disables periodic re-checks
    pub read_consistency_interval_secs: Option<f64>,
    pub storage_options: StorageOptions,
}

impl LocalConfig {
    pub fn uri(&self) -> &str {
        self.location.uri()
    }

    pub fn read_consistency(&self) -> ReadConsistency {
        ReadConsistency::from_engine_seconds(self.read_consistency_interval_secs)
    }
}

/// Resolved configuration for a managed-cloud connection.
#[derive(Debug)]
pub struct RemoteConfig {
    pub location: RemoteLocation,
    pub api_key: SecretString,
    pub region: String,
    pub host_override: Option<String>,
    pub options: RemoteOptions,
}

impl RemoteConfig {
    pub fn uri(&self) -> &str {
        self.location.uri()
    }

    pub fn database(&self) -> &str {
        self.location.database()
    }

    /// Service endpoint: the host override, or the regional endpoint for the
    /// database.
    pub fn base_url(&self) -> String {
        match &self.host_override {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}.{}.api.lancedb.com", self.database(), self.region),
        }
    }
}

/// Everything needed to open one connection, per location variant.
#[derive(Debug)]
pub enum ConnectionConfig {
    Local(LocalConfig),
    Remote(RemoteConfig, ProvisionedPool),
}
