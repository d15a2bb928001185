//! Read-consistency settings for embedded connections.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How often an embedded reader re-checks for writes committed by other
/// processes.
///
/// Writes are always consistent; this only affects reads.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadConsistency {
    /// Never re-check; callers refresh explicitly
    #[default]
    Manual,
    /// Re-check before every read
    Strong,
    /// Re-check once the interval has elapsed since the last check
    Eventual(Duration),
}

impl ReadConsistency {
    /// Interpret the engine-facing interval in fractional seconds.
    ///
    /// Values that cannot form a duration (negative, NaN) are treated as
    /// absent.
    pub fn from_engine_seconds(secs: Option<f64>) -> Self {
        match secs.map(Duration::try_from_secs_f64) {
            Some(Ok(interval)) if interval.is_zero() => ReadConsistency::Strong,
            Some(Ok(interval)) => ReadConsistency::Eventual(interval),
            Some(Err(_)) | None => ReadConsistency::Manual,
        }
    }

    /// The engine-facing interval in fractional seconds.
    pub fn engine_seconds(&self) -> Option<f64> {
        match self {
            ReadConsistency::Manual => None,
            ReadConsistency::Strong => Some(0.0),
            ReadConsistency::Eventual(interval) => Some(interval.as_secs_f64()),
        }
    }
}
