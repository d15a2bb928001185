//! Read-consistency interval conversion.

use crate::error::ConnectError;

/// Convert a read-consistency interval into the engine's fractional seconds.
///
/// `None` stays `None` (never re-check). Zero means re-check before every
/// read.
///
/// # Errors
///
/// Returns `ConnectError::InvalidConfig` for a negative interval.
pub fn to_engine_seconds(interval: Option<chrono::Duration>) -> Result<Option<f64>, ConnectError> {
    interval
        .map(|interval| {
            interval.to_std().map(|d| d.as_secs_f64()).map_err(|_| {
                ConnectError::InvalidConfig(format!(
                    "read_consistency_interval must not be negative, got {interval}"
                ))
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_none_passes_through() {
        assert_eq!(to_engine_seconds(None).unwrap(), None);
    }

    #[test]
    fn test_zero_is_strong() {
        assert_eq!(to_engine_seconds(Some(Duration::zero())).unwrap(), Some(0.0));
    }

    #[test]
    fn test_positive_seconds() {
        assert_eq!(to_engine_seconds(Some(Duration::seconds(5))).unwrap(), Some(5.0));
        let secs = to_engine_seconds(Some(Duration::milliseconds(1250)))
            .unwrap()
            .unwrap();
        assert!((secs - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_negative_rejected() {
        let result = to_engine_seconds(Some(Duration::seconds(-1)));
        match result {
            Err(ConnectError::InvalidConfig(message)) => {
                assert!(message.contains("read_consistency_interval"))
            }
            other => panic!("Expected InvalidConfig, got {other:?}"),
        }
    }
}
