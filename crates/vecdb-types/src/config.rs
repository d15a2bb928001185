//! Configuration loading for vecdb clients.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/vecdb/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::TypesError;

/// Region used for managed-cloud connections when none is given.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Client settings shared by every connection the process opens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Location used when the caller does not name one
    #[serde(default)]
    pub default_location: Option<String>,

    /// Managed-cloud region
    #[serde(default = "default_region")]
    pub region: String,

    /// Replaces the managed-cloud endpoint derived from database and region
    #[serde(default)]
    pub host_override: Option<String>,

    /// Embedded read-consistency interval in seconds (unset = never re-check)
    #[serde(default)]
    pub read_consistency_interval_secs: Option<f64>,

    /// Worker threads for managed-cloud request fan-out (unset = default)
    #[serde(default)]
    pub request_threads: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_location: None,
            region: default_region(),
            host_override: None,
            read_consistency_interval_secs: None,
            request_threads: None,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/vecdb/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (VECDB_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, TypesError> {
        let default_config_path = default_config_dir().join("config");

        let mut builder = Config::builder()
            .set_default("region", default_region())?
            .set_default("log_level", default_log_level())?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // VECDB_REGION, VECDB_HOST_OVERRIDE, VECDB_REQUEST_THREADS, ...
        builder = builder.add_source(Environment::with_prefix("VECDB").try_parsing(true));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.region.trim().is_empty() {
            return Err(TypesError::Config("region must not be empty".to_string()));
        }
        if self.request_threads == Some(0) {
            return Err(TypesError::Config(
                "request_threads must be > 0".to_string(),
            ));
        }
        self.read_consistency_interval()?;
        Ok(())
    }

    /// The configured read-consistency interval as a signed duration.
    ///
    /// The sign is kept so that a negative configured value is rejected by the
    /// connection layer rather than silently clamped here. NaN, infinities and
    /// values past the microsecond range are errors.
    pub fn read_consistency_interval(&self) -> Result<Option<chrono::Duration>, TypesError> {
        let Some(secs) = self.read_consistency_interval_secs else {
            return Ok(None);
        };
        let micros = (secs * 1_000_000.0).round();
        if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
            return Err(TypesError::Config(format!(
                "read_consistency_interval_secs must be a finite number of seconds, got {secs}"
            )));
        }
        Ok(Some(chrono::Duration::microseconds(micros as i64)))
    }
}

fn default_config_dir() -> PathBuf {
    ProjectDirs::from("", "", "vecdb")
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
