//! API key resolution for managed-cloud connections.
//!
//! An explicit, non-empty key always wins. Otherwise the key comes from
//! [`API_KEY_ENV`], looked up through an injected [`EnvSource`] so tests never
//! have to touch process state.

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::ConnectError;

/// Environment variable consulted when no API key is passed explicitly.
pub const API_KEY_ENV: &str = "LANCEDB_API_KEY";

/// Read-only view of environment variables.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fixed set of variables.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Resolve the API key for `location`.
///
/// # Errors
///
/// Returns `ConnectError::MissingCredential` naming `location` when neither
/// the explicit key nor the environment supplies a non-empty value.
pub fn resolve_api_key(
    explicit: Option<SecretString>,
    env: &dyn EnvSource,
    location: &str,
) -> Result<SecretString, ConnectError> {
    if let Some(key) = explicit.filter(|key| !key.expose_secret().is_empty()) {
        debug!(location, "Using explicit API key");
        return Ok(key);
    }

    match env.var(API_KEY_ENV).filter(|value| !value.is_empty()) {
        Some(value) => {
            debug!(location, env = API_KEY_ENV, "Using API key from environment");
            Ok(SecretString::from(value))
        }
        None => Err(ConnectError::MissingCredential {
            location: location.to_string(),
        }),
    }
}
