//! Recording backend for testing.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use secrecy::ExposeSecret;
use vecdb_types::{ReadConsistency, StorageOptions};

use crate::backend::{AsyncConnector, LocalBackend, NativeConnectRequest, RemoteBackend};
use crate::connection::{validate_table_name, Connection, TableRef};
use crate::error::ConnectError;
use crate::options::{LocalConfig, RemoteConfig};
use crate::pool::WorkerPool;

/// One constructor invocation seen by a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Local {
        uri: String,
        read_consistency_interval_secs: Option<f64>,
        storage_options: StorageOptions,
    },
    Remote {
        uri: String,
        api_key: String,
        region: String,
        host_override: Option<String>,
        workers: usize,
    },
    Native {
        uri: String,
        api_key: Option<String>,
        region: String,
        host_override: Option<String>,
        read_consistency_interval_secs: Option<f64>,
        storage_options: Option<StorageOptions>,
    },
}

/// Backend that records every constructor call and hands out in-memory
/// sessions.
///
/// Useful for exercising routing without storage or network access. Clones
/// share the same call log.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    failure: Option<String>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose constructors record the call and then fail with
    /// `BackendConstruction(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            calls: Arc::default(),
            failure: Some(message.into()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: RecordedCall) -> Result<(), ConnectError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        match &self.failure {
            Some(message) => Err(ConnectError::BackendConstruction(message.clone())),
            None => Ok(()),
        }
    }
}

impl LocalBackend for RecordingBackend {
    fn construct(&self, config: &LocalConfig) -> Result<Box<dyn Connection>, ConnectError> {
        self.record(RecordedCall::Local {
            uri: config.uri().to_string(),
            read_consistency_interval_secs: config.read_consistency_interval_secs,
            storage_options: config.storage_options.clone(),
        })?;
        Ok(Box::new(InMemoryDatabase::new(
            config.uri(),
            config.read_consistency(),
        )))
    }
}

impl RemoteBackend for RecordingBackend {
    fn construct(
        &self,
        config: &RemoteConfig,
        pool: Arc<WorkerPool>,
    ) -> Result<Box<dyn Connection>, ConnectError> {
        self.record(RecordedCall::Remote {
            uri: config.uri().to_string(),
            api_key: config.api_key.expose_secret().to_string(),
            region: config.region.clone(),
            host_override: config.host_override.clone(),
            workers: pool.workers(),
        })?;
        Ok(Box::new(InMemoryDatabase::new(
            config.uri(),
            ReadConsistency::Strong,
        )))
    }
}

#[async_trait]
impl AsyncConnector for RecordingBackend {
    async fn connect(
        &self,
        request: NativeConnectRequest,
    ) -> Result<Box<dyn Connection>, ConnectError> {
        self.record(RecordedCall::Native {
            uri: request.uri.clone(),
            api_key: request
                .api_key
                .as_ref()
                .map(|key| key.expose_secret().to_string()),
            region: request.region.clone(),
            host_override: request.host_override.clone(),
            read_consistency_interval_secs: request.read_consistency_interval_secs,
            storage_options: request.storage_options.clone(),
        })?;
        Ok(Box::new(InMemoryDatabase::new(
            &request.uri,
            ReadConsistency::from_engine_seconds(request.read_consistency_interval_secs),
        )))
    }
}

/// Session keeping its table catalog in memory.
#[derive(Debug)]
pub struct InMemoryDatabase {
    uri: String,
    read_consistency: ReadConsistency,
    tables: Mutex<BTreeSet<String>>,
}

impl InMemoryDatabase {
    pub fn new(uri: impl Into<String>, read_consistency: ReadConsistency) -> Self {
        Self {
            uri: uri.into(),
            read_consistency,
            tables: Mutex::default(),
        }
    }

    fn table_ref(&self, name: &str) -> TableRef {
        TableRef {
            name: name.to_string(),
            uri: format!("{}/{}", self.uri.trim_end_matches('/'), name),
            read_consistency: self.read_consistency,
        }
    }
}

#[async_trait]
impl Connection for InMemoryDatabase {
    fn uri(&self) -> &str {
        &self.uri
    }

    async fn table_names(&self) -> Result<Vec<String>, ConnectError> {
        let tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(tables.iter().cloned().collect())
    }

    async fn open_table(&self, name: &str) -> Result<TableRef, ConnectError> {
        let tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        if tables.contains(name) {
            Ok(self.table_ref(name))
        } else {
            Err(ConnectError::TableNotFound(name.to_string()))
        }
    }

    async fn create_table(&self, name: &str) -> Result<TableRef, ConnectError> {
        validate_table_name(name)?;
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        if !tables.insert(name.to_string()) {
            return Err(ConnectError::TableAlreadyExists(name.to_string()));
        }
        Ok(self.table_ref(name))
    }

    async fn drop_table(&self, name: &str) -> Result<(), ConnectError> {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        if tables.remove(name) {
            Ok(())
        } else {
            Err(ConnectError::TableNotFound(name.to_string()))
        }
    }
}
