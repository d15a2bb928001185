//! Connection error types.

use thiserror::Error;
use vecdb_types::TypesError;

/// Errors that can occur while connecting or using a connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Managed-cloud location selected but no API key could be resolved
    #[error("API key is required to connect to the managed service: {location}")]
    MissingCredential { location: String },

    /// Malformed or unrecognized connection parameter
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failure raised by a backend constructor
    #[error("Backend construction failed: {0}")]
    BackendConstruction(String),

    /// Table does not exist
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Table already exists
    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),

    /// Table name rejected before reaching storage
    #[error("Invalid table name '{name}': {reason}")]
    InvalidTableName { name: String, reason: String },

    /// Location scheme that the embedded backend cannot open itself
    #[error("Storage scheme '{0}' is not supported by the embedded backend")]
    UnsupportedStore(String),

    /// Worker pool no longer accepts work
    #[error("Worker pool has been shut down")]
    PoolShutdown,

    /// Task running on the worker pool panicked or was cancelled
    #[error("Worker task failed: {0}")]
    Worker(String),

    /// Non-success response from the managed service
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Request could not be sent or its response could not be read
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<TypesError> for ConnectError {
    fn from(err: TypesError) -> Self {
        ConnectError::InvalidConfig(err.to_string())
    }
}
