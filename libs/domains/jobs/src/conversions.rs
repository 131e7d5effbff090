use std::str::FromStr;

use dispatch_core::{JobStatus, JobType, Priority};

use crate::entity;
use crate::error::{JobError, JobResult};
use crate::models::Job;

impl TryFrom<entity::Model> for Job {
    type Error = JobError;

    fn try_from(model: entity::Model) -> JobResult<Self> {
        Ok(Job {
            id: model.id,
            job_type: JobType::from_str(&model.job_type)
                .map_err(|e| JobError::Internal(format!("corrupt job row: {e}")))?,
            data: model.data,
            message: model.message,
            priority: Priority::from_str(&model.priority)
                .map_err(|e| JobError::Internal(format!("corrupt job row: {e}")))?,
            status: JobStatus::from_str(&model.status)
                .map_err(|e| JobError::Internal(format!("corrupt job row: {e}")))?,
            created_at: model.created_at.into(),
            execution_at: model.execution_at.into(),
        })
    }
}
