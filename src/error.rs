//! Error types for an estimation run.
//!
//! Every variant is fatal to the current invocation. Nothing is retried and
//! no partial estimate is ever returned in place of an error.

use std::any::Any;
use thiserror::Error;

/// Boxed source error for resource failures coming from either backend.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure modes of [`crate::Coordinator::estimate`].
///
/// # Examples
/// ```
/// use piapprox::EstimateError;
///
/// let err = EstimateError::InvalidInput { total: 1 };
/// assert_eq!(err.to_string(), "sample size must be > 1");
/// ```
#[derive(Debug, Error)]
pub enum EstimateError {
    /// The sample budget was 0 or 1. Detected before any worker is spawned.
    #[error("sample size must be > 1")]
    InvalidInput {
        /// The rejected sample budget
        total: u64,
    },

    /// The worker pool could not be built or a worker could not be spawned.
    #[error("failed to start {what}: {source}")]
    ResourceExhaustion {
        /// What was being started (a named worker or the pool)
        what: String,
        /// Underlying OS or pool error
        #[source]
        source: BoxedSource,
    },

    /// A spawned worker could not be joined, so its trials are unaccounted for.
    #[error("worker {worker} was lost before it could be joined: {reason}")]
    JoinFailure {
        /// Index of the lost worker in spawn order
        worker: usize,
        /// Panic message recovered from the worker, if any
        reason: String,
    },
}

impl EstimateError {
    pub(crate) fn resource(what: impl Into<String>, source: impl Into<BoxedSource>) -> Self {
        EstimateError::ResourceExhaustion {
            what: what.into(),
            source: source.into(),
        }
    }

    pub(crate) fn lost_worker(worker: usize, payload: &(dyn Any + Send)) -> Self {
        EstimateError::JoinFailure {
            worker,
            reason: panic_message(payload),
        }
    }
}

/// Recover the message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_invalid_input_message_matches_cli_diagnostic() {
        let err = EstimateError::InvalidInput { total: 0 };
        assert_eq!(format!("{}", err), "sample size must be > 1");
    }

    #[test]
    fn test_resource_exhaustion_keeps_source() {
        let err = EstimateError::resource(
            "worker 3",
            io::Error::new(io::ErrorKind::OutOfMemory, "no more threads"),
        );
        assert_eq!(
            err.to_string(),
            "failed to start worker 3: no more threads"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_join_failure_recovers_str_payload() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        let err = EstimateError::lost_worker(2, payload.as_ref());
        match err {
            EstimateError::JoinFailure { worker, reason } => {
                assert_eq!(worker, 2);
                assert_eq!(reason, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_join_failure_recovers_string_payload() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("formatted boom"));
        let err = EstimateError::lost_worker(0, payload.as_ref());
        assert_eq!(
            err.to_string(),
            "worker 0 was lost before it could be joined: formatted boom"
        );
    }

    #[test]
    fn test_join_failure_with_opaque_payload() {
        let payload: Box<dyn Any + Send> = Box::new(42_u32);
        let err = EstimateError::lost_worker(1, payload.as_ref());
        assert!(err.to_string().ends_with("unknown panic payload"));
    }
}
