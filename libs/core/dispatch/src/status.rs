use async_trait::async_trait;

/// Opportunistic bridge from the dispatch pipeline to the durable job
/// record's status column. Implemented outside this crate (see
/// `domain_jobs::RepositoryStatusSink`) so the pipeline never takes a
/// direct dependency on the durable repository; a dispatcher constructed
/// without one simply skips status updates.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait StatusSink: Send + Sync {
    /// Called once a handler has executed successfully.
    async fn mark_completed(&self, job_id: i64);

    /// Called once a record is dropped for good: an unknown job type, a
    /// serialization failure, or retries exhausted. Never called for a
    /// failure that is still being rescheduled.
    async fn mark_failed(&self, job_id: i64);
}
