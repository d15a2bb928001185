//! Embedded backend.
//!
//! Each table is a `<name>.lance` directory under the database location.
//! Filesystem paths and `file://` URIs are handled here directly; object-store
//! locations are accepted at connect time but table operations on them report
//! `UnsupportedStore`, since reaching a bucket is the object-store engine's job.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};
use vecdb_types::{LocalLocation, Location, ReadConsistency, StorageOptions};

use crate::backend::{AsyncConnector, LocalBackend, NativeConnectRequest};
use crate::connection::{validate_table_name, Connection, TableRef};
use crate::error::ConnectError;
use crate::options::LocalConfig;

/// Directory suffix marking a table.
pub const TABLE_SUFFIX: &str = ".lance";

/// Storage option keys understood by the object-store layer.
///
/// Keys starting with `aws_`, `google_` or `azure_` are also accepted as
/// provider-specific settings.
pub const STORAGE_OPTION_KEYS: &[&str] = &[
    "allow_http",
    "allow_invalid_certificates",
    "connect_timeout",
    "timeout",
    "user_agent",
    "proxy_url",
    "proxy_ca_certificate",
    "proxy_excludes",
    "client_max_retries",
    "client_retry_timeout",
];

const PROVIDER_PREFIXES: &[&str] = &["aws_", "google_", "azure_"];

fn validate_storage_options(options: &StorageOptions) -> Result<(), ConnectError> {
    let unknown: Vec<&str> = options
        .keys()
        .filter(|key| {
            !STORAGE_OPTION_KEYS.contains(key)
                && !PROVIDER_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
        })
        .collect();
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(ConnectError::InvalidConfig(format!(
            "Unknown storage option(s): {}",
            unknown.join(", ")
        )))
    }
}

/// Constructor for [`EmbeddedDatabase`] sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedBackend;

impl EmbeddedBackend {
    pub fn new() -> Self {
        Self
    }
}

impl LocalBackend for EmbeddedBackend {
    fn construct(&self, config: &LocalConfig) -> Result<Box<dyn Connection>, ConnectError> {
        validate_storage_options(&config.storage_options)?;
        Ok(Box::new(EmbeddedDatabase::new(
            config.location.clone(),
            config.read_consistency(),
        )))
    }
}

#[async_trait]
impl AsyncConnector for EmbeddedBackend {
    async fn connect(
        &self,
        request: NativeConnectRequest,
    ) -> Result<Box<dyn Connection>, ConnectError> {
        let location = match Location::classify(request.uri) {
            Location::Local(location) => location,
            Location::Remote(remote) => {
                return Err(ConnectError::BackendConstruction(format!(
                    "embedded connector cannot open {}",
                    remote.uri()
                )))
            }
        };

        if let Some(path) = location.filesystem_path() {
            match tokio::fs::metadata(&path).await {
                Ok(meta) if !meta.is_dir() => {
                    return Err(ConnectError::BackendConstruction(format!(
                        "{} exists and is not a directory",
                        path.display()
                    )))
                }
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(path = %path.display(), "Database directory will be created on first write");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Box::new(EmbeddedDatabase::new(
            location,
            ReadConsistency::from_engine_seconds(request.read_consistency_interval_secs),
        )))
    }
}

/// An embedded database session.
#[derive(Debug, Clone)]
pub struct EmbeddedDatabase {
    location: LocalLocation,
    read_consistency: ReadConsistency,
}

impl EmbeddedDatabase {
    pub fn new(location: LocalLocation, read_consistency: ReadConsistency) -> Self {
        Self {
            location,
            read_consistency,
        }
    }

    pub fn read_consistency(&self) -> ReadConsistency {
        self.read_consistency
    }

    fn root(&self) -> Result<PathBuf, ConnectError> {
        self.location.filesystem_path().ok_or_else(|| {
            ConnectError::UnsupportedStore(self.location.scheme().unwrap_or_default().to_string())
        })
    }

    fn table_dir(&self, name: &str) -> Result<PathBuf, ConnectError> {
        validate_table_name(name)?;
        Ok(self.root()?.join(format!("{name}{TABLE_SUFFIX}")))
    }

    fn table_ref(&self, name: &str, dir: PathBuf) -> TableRef {
        TableRef {
            name: name.to_string(),
            uri: dir.to_string_lossy().into_owned(),
            read_consistency: self.read_consistency,
        }
    }
}

#[async_trait]
impl Connection for EmbeddedDatabase {
    fn uri(&self) -> &str {
        self.location.uri()
    }

    async fn table_names(&self) -> Result<Vec<String>, ConnectError> {
        let root = self.root()?;
        let mut entries = match tokio::fs::read_dir(&root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let file_name = entry.file_name();
            if let Some(name) = file_name.to_str().and_then(|n| n.strip_suffix(TABLE_SUFFIX)) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn open_table(&self, name: &str) -> Result<TableRef, ConnectError> {
        let dir = self.table_dir(name)?;
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(self.table_ref(name, dir)),
            Ok(_) => Err(ConnectError::TableNotFound(name.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ConnectError::TableNotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_table(&self, name: &str) -> Result<TableRef, ConnectError> {
        let dir = self.table_dir(name)?;
        tokio::fs::create_dir_all(self.root()?).await?;
        match tokio::fs::create_dir(&dir).await {
            Ok(()) => {
                info!(table = name, path = %dir.display(), "Created table");
                Ok(self.table_ref(name, dir))
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(ConnectError::TableAlreadyExists(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn drop_table(&self, name: &str) -> Result<(), ConnectError> {
        let dir = self.table_dir(name)?;
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                info!(table = name, "Dropped table");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ConnectError::TableNotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
