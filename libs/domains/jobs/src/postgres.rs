use async_trait::async_trait;
use chrono::Utc;
use dispatch_core::{JobStatus, JobType, Priority};
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use crate::entity;
use crate::error::{JobError, JobResult};
use crate::models::Job;
use crate::repository::JobRepository;

pub struct PgJobRepository {
    db: DatabaseConnection,
}

impl PgJobRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn insert(
        &self,
        job_type: JobType,
        data: String,
        message: String,
        priority: Priority,
        delay_seconds: i64,
    ) -> JobResult<Job> {
        let now = Utc::now();
        let execution_at = now + chrono::Duration::seconds(delay_seconds);

        let active_model = entity::ActiveModel {
            job_type: Set(job_type.as_str().to_string()),
            data: Set(data),
            message: Set(message),
            priority: Set(priority.to_string()),
            delay_seconds: Set(delay_seconds),
            status: Set(JobStatus::Queued.as_str().to_string()),
            created_at: Set(now.into()),
            execution_at: Set(execution_at.into()),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        tracing::info!(job_id = model.id, "inserted durable job record");
        Job::try_from(model)
    }

    async fn get_by_id(&self, id: i64) -> JobResult<Option<Job>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        model.map(Job::try_from).transpose()
    }

    async fn list(&self, status: Option<JobStatus>) -> JobResult<Vec<Job>> {
        let mut query = entity::Entity::find().order_by_desc(entity::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(entity::Column::Status.eq(status.as_str()));
        }
        let models = query.all(&self.db).await?;
        models.into_iter().map(Job::try_from).collect()
    }

    async fn set_status(&self, id: i64, status: JobStatus) -> JobResult<()> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(JobError::NotFound(id))?;
        let mut active: entity::ActiveModel = model.into();
        active.status = Set(status.as_str().to_string());
        active.update(&self.db).await?;
        Ok(())
    }
}
