//! Tracking Recorder Port
//!
//! Defines the interface for persisting login-tracking rows.

use crate::domain::entities::LoginTracking;
use async_trait::async_trait;

/// Boxed cause carried by tracking errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Tracking persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    /// The recorder could not be brought up.
    #[error("tracking store unavailable: {0}")]
    Unavailable(#[source] BoxError),
    /// The insert did not complete.
    #[error("failed to insert tracking record: {0}")]
    PersistenceFailure(#[source] BoxError),
}

/// Recorder for login-tracking events.
///
/// Each call writes exactly one row. There is no deduplication: inserting
/// the same record twice yields two rows. Failures are returned as-is and
/// never retried.
#[async_trait]
pub trait TrackingRecorder: Send + Sync {
    /// Insert one record.
    async fn insert(&self, record: &LoginTracking) -> Result<(), TrackingError>;
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_persistence_failure_keeps_source() {
        let cause = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "connection reset");
        let err = TrackingError::PersistenceFailure(Box::new(cause));

        assert!(err.to_string().contains("connection reset"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_unavailable_display() {
        let err = TrackingError::Unavailable("disk full".into());
        assert_eq!(err.to_string(), "tracking store unavailable: disk full");
    }
}
