//! Typed connection options.
//!
//! The embedded path forwards object-store settings as [`StorageOptions`].
//! The remote path has a closed surface, [`RemoteOptions`], parsed from the
//! caller's extra options with every unknown key rejected.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Object-store settings forwarded to the storage layer.
///
/// Keys and values are passed through verbatim; the storage collaborator
/// decides which keys it accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageOptions(BTreeMap<String, String>);

impl StorageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Merge `other` into `self`; keys in `other` win.
    pub fn merge(&mut self, other: &BTreeMap<String, String>) {
        for (key, value) in other {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl From<BTreeMap<String, String>> for StorageOptions {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StorageOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Option key: seconds to wait while establishing a connection to the service.
pub const CONNECTION_TIMEOUT_KEY: &str = "connection_timeout";

/// Option key: seconds to wait for a response from the service.
pub const READ_TIMEOUT_KEY: &str = "read_timeout";

/// Keys accepted by the remote path.
pub const REMOTE_OPTION_KEYS: &[&str] = &[CONNECTION_TIMEOUT_KEY, READ_TIMEOUT_KEY];

/// Settings recognized by the remote service client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteOptions {
    /// Time allowed to establish a connection
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: Duration,

    /// Time allowed for a full request/response exchange
    #[serde(default = "default_read_timeout")]
    pub read_timeout: Duration,
}

fn default_connection_timeout() -> Duration {
    Duration::from_secs(120)
}

fn default_read_timeout() -> Duration {
    Duration::from_secs(300)
}

impl Default for RemoteOptions {
    fn default() -> Self {
        Self {
            connection_timeout: default_connection_timeout(),
            read_timeout: default_read_timeout(),
        }
    }
}

impl RemoteOptions {
    /// Parse the caller's extra options.
    ///
    /// Unknown keys are all reported together, sorted, before any value is
    /// looked at.
    pub fn from_extra(extra: &BTreeMap<String, String>) -> Result<Self, TypesError> {
        let unknown: Vec<String> = extra
            .keys()
            .filter(|key| !REMOTE_OPTION_KEYS.contains(&key.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(TypesError::UnknownOptions(unknown));
        }

        let mut options = Self::default();
        if let Some(value) = extra.get(CONNECTION_TIMEOUT_KEY) {
            options.connection_timeout = parse_seconds(CONNECTION_TIMEOUT_KEY, value)?;
        }
        if let Some(value) = extra.get(READ_TIMEOUT_KEY) {
            options.read_timeout = parse_seconds(READ_TIMEOUT_KEY, value)?;
        }
        Ok(options)
    }
}

fn parse_seconds(key: &str, value: &str) -> Result<Duration, TypesError> {
    let invalid = |reason: &str| TypesError::InvalidOption {
        key: key.to_string(),
        reason: format!("{reason}, got '{value}'"),
    };
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|_| invalid("expected a number of seconds"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err(invalid("must be a positive number of seconds"));
    }
    Duration::try_from_secs_f64(secs).map_err(|_| invalid("out of range"))
}
