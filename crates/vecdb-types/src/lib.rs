//! # vecdb-types
//!
//! Shared domain types for the vecdb connection layer.
//!
//! - Locations: `db://` managed-cloud databases vs. filesystem/object-store paths
//! - Options: typed storage and remote option sets
//! - Read consistency: embedded re-check policy
//! - Settings: layered client configuration
//!
//! ## Usage
//!
//! ```rust
//! use vecdb_types::Location;
//!
//! assert!(Location::classify("db://mydb").is_remote());
//! assert!(!Location::classify("s3://bucket/db").is_remote());
//! ```

pub mod config;
pub mod consistency;
pub mod error;
pub mod location;
pub mod options;

pub use config::{Settings, DEFAULT_REGION};
pub use consistency::ReadConsistency;
pub use error::TypesError;
pub use location::{known_scheme, LocalLocation, Location, RemoteLocation, KNOWN_SCHEMES, REMOTE_SCHEME};
pub use options::{
    RemoteOptions, StorageOptions, CONNECTION_TIMEOUT_KEY, READ_TIMEOUT_KEY, REMOTE_OPTION_KEYS,
};
