//! Scheduler error types

use std::time::Duration;
use thiserror::Error;

/// Failures surfaced to the submitter of an operation
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Evicted before starting: the queue was full when a newer request arrived
    #[error("evicted from a full queue before starting")]
    QueueOverflow,

    /// Waited longer than the configured timeout without being admitted
    #[error("timed out after {0:?} waiting for admission")]
    Timeout(Duration),

    /// The scheduler shut down before the operation could run
    #[error("scheduler shut down")]
    Shutdown,

    /// The operation ran and failed; its error passes through verbatim
    #[error(transparent)]
    Operation(#[from] eyre::Report),
}

impl ScheduleError {
    /// Check if the operation was never started
    pub fn never_ran(&self) -> bool {
        !matches!(self, ScheduleError::Operation(_))
    }

    /// Check if this is a queue-overflow eviction
    pub fn is_overflow(&self) -> bool {
        matches!(self, ScheduleError::QueueOverflow)
    }

    /// Check if this is a queue-wait timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, ScheduleError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::eyre;

    #[test]
    fn test_never_ran() {
        assert!(ScheduleError::QueueOverflow.never_ran());
        assert!(ScheduleError::Timeout(Duration::from_secs(30)).never_ran());
        assert!(ScheduleError::Shutdown.never_ran());
        assert!(!ScheduleError::Operation(eyre!("boom")).never_ran());
    }

    #[test]
    fn test_predicates() {
        assert!(ScheduleError::QueueOverflow.is_overflow());
        assert!(!ScheduleError::QueueOverflow.is_timeout());
        assert!(ScheduleError::Timeout(Duration::from_secs(1)).is_timeout());
        assert!(!ScheduleError::Shutdown.is_overflow());
    }

    #[test]
    fn test_operation_error_is_transparent() {
        let error = ScheduleError::Operation(eyre!("backend refused"));
        assert_eq!(error.to_string(), "backend refused");
    }

    #[test]
    fn test_timeout_message_includes_wait() {
        let error = ScheduleError::Timeout(Duration::from_millis(250));
        assert!(error.to_string().contains("250ms"));
    }
}
