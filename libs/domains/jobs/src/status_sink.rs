use std::sync::Arc;

use async_trait::async_trait;
use dispatch_core::{JobStatus, StatusSink};

use crate::repository::JobRepository;

/// Bridges the dispatch pipeline's opportunistic status updates onto the
/// durable job repository. A `set_status` failure is logged and swallowed,
/// the same posture the retry path takes toward ready-index re-insertion
/// failures — the durable status column is best-effort, never load-bearing
/// for dispatch control flow.
pub struct RepositoryStatusSink<R: JobRepository> {
    repository: Arc<R>,
}

impl<R: JobRepository> RepositoryStatusSink<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: JobRepository> StatusSink for RepositoryStatusSink<R> {
    async fn mark_completed(&self, job_id: i64) {
        if let Err(e) = self.repository.set_status(job_id, JobStatus::Completed).await {
            tracing::warn!(job_id, error = %e, "failed to mark job completed");
        }
    }

    async fn mark_failed(&self, job_id: i64) {
        if let Err(e) = self.repository.set_status(job_id, JobStatus::Failed).await {
            tracing::warn!(job_id, error = %e, "failed to mark job failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockJobRepository;

    #[tokio::test]
    async fn mark_completed_calls_set_status_completed() {
        let mut repo = MockJobRepository::new();
        repo.expect_set_status()
            .withf(|id, status| *id == 9 && *status == JobStatus::Completed)
            .returning(|_, _| Ok(()));
        let sink = RepositoryStatusSink::new(Arc::new(repo));
        sink.mark_completed(9).await;
    }

    #[tokio::test]
    async fn mark_failed_calls_set_status_failed() {
        let mut repo = MockJobRepository::new();
        repo.expect_set_status()
            .withf(|id, status| *id == 9 && *status == JobStatus::Failed)
            .returning(|_, _| Ok(()));
        let sink = RepositoryStatusSink::new(Arc::new(repo));
        sink.mark_failed(9).await;
    }

    #[tokio::test]
    async fn set_status_failure_is_swallowed_not_propagated() {
        let mut repo = MockJobRepository::new();
        repo.expect_set_status()
            .returning(|id, _| Err(crate::error::JobError::NotFound(id)));
        let sink = RepositoryStatusSink::new(Arc::new(repo));
        // Does not panic even though the repository call fails.
        sink.mark_completed(404).await;
    }
}
