use async_trait::async_trait;
use dispatch_core::JobStatus;

use crate::error::JobResult;
use crate::models::Job;

/// Persistence interface for the durable job record (governing design
/// document §3). Implementations back onto whatever relational store is
/// configured; the dispatch pipeline never talks to this trait directly —
/// only `JobService` does, at submit/list/get time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn insert(
        &self,
        job_type: dispatch_core::JobType,
        data: String,
        message: String,
        priority: dispatch_core::Priority,
        delay_seconds: i64,
    ) -> JobResult<Job>;

    async fn get_by_id(&self, id: i64) -> JobResult<Option<Job>>;

    async fn list(&self, status: Option<JobStatus>) -> JobResult<Vec<Job>>;

    async fn set_status(&self, id: i64, status: JobStatus) -> JobResult<()>;
}
