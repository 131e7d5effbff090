use std::sync::Arc;

use dispatch_core::ReadyIndex;
use domain_jobs::{JobService, PgJobRepository};
use sea_orm::DatabaseConnection;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub db: DatabaseConnection,
    pub redis: redis::aio::ConnectionManager,
    pub jobs: JobService<PgJobRepository>,
}

impl AppState {
    pub fn new(
        config: Config,
        db: DatabaseConnection,
        redis: redis::aio::ConnectionManager,
        index: Arc<dyn ReadyIndex>,
    ) -> Self {
        let repository = PgJobRepository::new(db.clone());
        let jobs = JobService::new(repository, index);
        Self {
            config,
            db,
            redis,
            jobs,
        }
    }
}
