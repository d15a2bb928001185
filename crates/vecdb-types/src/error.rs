//! Error types for shared vecdb types.

use thiserror::Error;

/// Errors raised while loading settings or parsing typed options.
#[derive(Debug, Error)]
pub enum TypesError {
    /// Configuration loading error
    #[error("Configuration error: {0}")]
    Config(String),

    /// One or more option keys are not part of the recognized surface
    #[error("Unknown option(s): {}", .0.join(", "))]
    UnknownOptions(Vec<String>),

    /// A recognized option carried a value that could not be used
    #[error("Invalid value for option '{key}': {reason}")]
    InvalidOption { key: String, reason: String },
}

impl From<config::ConfigError> for TypesError {
    fn from(err: config::ConfigError) -> Self {
        TypesError::Config(err.to_string())
    }
}
