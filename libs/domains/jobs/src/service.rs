use std::sync::Arc;

use dispatch_core::{DispatchRecord, JobStatus, Payload, ReadyIndex};
use tracing::instrument;

use crate::error::{JobError, JobResult};
use crate::models::{Job, SubmitJobRequest};
use crate::repository::JobRepository;

/// Business logic for the submit/list/get HTTP surface (governing design
/// document §6). On submit: validate, insert the durable record, then
/// publish a `DispatchRecord` into the ready index keyed by priority —
/// satisfying invariant 1 of §3 (a durable record implies at least one
/// historical ready-index insertion, or an explicit failure to the caller).
#[derive(Clone)]
pub struct JobService<R: JobRepository> {
    repository: Arc<R>,
    index: Arc<dyn ReadyIndex>,
}

impl<R: JobRepository> JobService<R> {
    pub fn new(repository: R, index: Arc<dyn ReadyIndex>) -> Self {
        Self {
            repository: Arc::new(repository),
            index,
        }
    }

    #[instrument(skip(self, request))]
    pub async fn submit(&self, request: SubmitJobRequest) -> JobResult<Job> {
        request
            .validate()
            .map_err(JobError::Validation)?;

        let job = self
            .repository
            .insert(
                request.job_type,
                request.payload.data.clone(),
                request.payload.message.clone(),
                request.priority,
                request.delay,
            )
            .await?;

        let record = DispatchRecord::new(
            job.id,
            job.job_type,
            Payload {
                data: job.data.clone(),
                message: job.message.clone(),
            },
            job.execution_at,
            job.priority,
        );
        let blob = record
            .to_blob()
            .map_err(|e| JobError::Internal(format!("failed to serialize dispatch record: {e}")))?;

        self.index
            .add(job.priority, &blob, record.score())
            .await
            .map_err(|e| JobError::BackendUnavailable(e.to_string()))?;

        Ok(job)
    }

    pub async fn list(&self, status: Option<JobStatus>) -> JobResult<Vec<Job>> {
        self.repository.list(status).await
    }

    pub async fn get(&self, id: i64) -> JobResult<Job> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(JobError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmitPayload;
    use crate::repository::MockJobRepository;
    use dispatch_core::index::MockReadyIndex;
    use dispatch_core::{JobType, Priority};

    fn sample_job() -> Job {
        Job {
            id: 1,
            job_type: JobType::Email,
            data: "user@example.com".into(),
            message: "hi".into(),
            priority: Priority::High,
            status: JobStatus::Queued,
            created_at: chrono::Utc::now(),
            execution_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn submit_inserts_then_publishes_to_ready_index() {
        let mut repo = MockJobRepository::new();
        repo.expect_insert().returning(|_, _, _, _, _| Ok(sample_job()));

        let mut index = MockReadyIndex::new();
        index.expect_add().returning(|_, _, _| Ok(()));

        let service = JobService::new(repo, Arc::new(index));
        let request = SubmitJobRequest {
            job_type: JobType::Email,
            payload: SubmitPayload {
                data: "user@example.com".into(),
                message: "hi".into(),
            },
            priority: Priority::High,
            delay: 0,
        };

        let job = service.submit(request).await.unwrap();
        assert_eq!(job.id, 1);
    }

    #[tokio::test]
    async fn submit_rejects_invalid_request_before_touching_repository() {
        let repo = MockJobRepository::new();
        let index = MockReadyIndex::new();
        let service = JobService::new(repo, Arc::new(index));

        let request = SubmitJobRequest {
            job_type: JobType::Email,
            payload: SubmitPayload {
                data: String::new(),
                message: "hi".into(),
            },
            priority: Priority::High,
            delay: 0,
        };

        let err = service.submit(request).await.unwrap_err();
        assert!(matches!(err, JobError::Validation(_)));
    }

    #[tokio::test]
    async fn get_missing_job_is_not_found() {
        let mut repo = MockJobRepository::new();
        repo.expect_get_by_id().returning(|_| Ok(None));
        let index = MockReadyIndex::new();
        let service = JobService::new(repo, Arc::new(index));

        let err = service.get(999).await.unwrap_err();
        assert!(matches!(err, JobError::NotFound(999)));
    }
}
