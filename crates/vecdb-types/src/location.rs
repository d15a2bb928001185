//! Database locations.
//!
//! A location is either a managed-cloud database (`db://<name>`) or anything
//! else: a filesystem path or an object-store URI. Classification looks at the
//! literal prefix only, so it is total and never ambiguous.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Prefix that marks a managed-cloud database.
pub const REMOTE_SCHEME: &str = "db://";

/// Scheme prefixes that are passed through normalization untouched.
///
/// Matching is case-sensitive.
pub const KNOWN_SCHEMES: &[&str] = &[
    "s3://",
    "s3+ddb://",
    "gs://",
    "az://",
    "abfss://",
    "db://",
    "file://",
    "memory://",
    "http://",
    "https://",
];

/// Returns the known scheme prefix of `uri`, if any.
pub fn known_scheme(uri: &str) -> Option<&'static str> {
    KNOWN_SCHEMES
        .iter()
        .copied()
        .find(|scheme| uri.starts_with(scheme))
}

/// A classified database location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    /// Filesystem path or object-store URI, opened by the embedded engine
    Local(LocalLocation),
    /// Managed-cloud database reached through the remote service
    Remote(RemoteLocation),
}

impl Location {
    /// Classify a (normalized) location string by its prefix.
    pub fn classify(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        if uri.starts_with(REMOTE_SCHEME) {
            Location::Remote(RemoteLocation { uri })
        } else {
            Location::Local(LocalLocation { uri })
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Location::Local(local) => local.uri(),
            Location::Remote(remote) => remote.uri(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Remote(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `db://` location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteLocation {
    uri: String,
}

impl RemoteLocation {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The opaque database name following `db://`, without trailing slashes.
    ///
    /// May be empty; the remote backend decides whether that is acceptable.
    pub fn database(&self) -> &str {
        self.uri[REMOTE_SCHEME.len()..].trim_end_matches('/')
    }
}

/// A filesystem or object-store location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalLocation {
    uri: String,
}

impl LocalLocation {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The URI scheme (`s3`, `gs`, `file`, ...) or `None` for a bare path.
    pub fn scheme(&self) -> Option<&str> {
        let (scheme, _) = self.uri.split_once("://")?;
        let valid = !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        valid.then_some(scheme)
    }

    /// The local directory backing this location, when it lives on the
    /// filesystem (a bare path or a `file://` URI).
    pub fn filesystem_path(&self) -> Option<PathBuf> {
        match self.scheme() {
            None => Some(PathBuf::from(&self.uri)),
            Some("file") => Some(PathBuf::from(&self.uri["file://".len()..])),
            Some(_) => None,
        }
    }
}
