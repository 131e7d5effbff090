use thiserror::Error;

use crate::record::Priority;

/// Error taxonomy for the dispatch pipeline. Each variant corresponds to one
/// of the error kinds enumerated by the governing design document (§7):
/// validation and backend failures surface to callers, while deserialization,
/// unknown-type, handler, and pool-stopped failures are recovered locally.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("backend unavailable ({context}): {source}")]
    BackendUnavailable {
        context: &'static str,
        #[source]
        source: redis::RedisError,
    },

    #[error("failed to deserialize dispatch record on priority {priority}: {source}")]
    Deserialization {
        priority: Priority,
        #[source]
        source: serde_json::Error,
    },

    #[error("no handler registered for job type {0}")]
    UnknownJobType(String),

    #[error("handler failed for job {job_id}: {reason}")]
    HandlerFailure { job_id: i64, reason: String },

    #[error("submit rejected: pool is stopped")]
    PoolStopped,
}

pub type DispatchResult<T> = Result<T, DispatchError>;

impl From<redis::RedisError> for DispatchError {
    fn from(source: redis::RedisError) -> Self {
        DispatchError::BackendUnavailable {
            context: "ready-index",
            source,
        }
    }
}
