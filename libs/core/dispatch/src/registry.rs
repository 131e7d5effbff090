use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{DispatchError, DispatchResult};
use crate::record::{DispatchRecord, JobType};

/// A type-specific executor (governing design document §4.5). `initialize`
/// populates handler-local state from the record's payload and is pure — no
/// state is shared between invocations; `execute` performs the effect.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Validate/prepare handler-local state from the record. The default
    /// implementation performs no validation.
    fn initialize(&self, _record: &DispatchRecord) -> DispatchResult<()> {
        Ok(())
    }

    /// Perform the effect. Errors feed the retry/backoff path.
    async fn execute(&self, record: &DispatchRecord) -> DispatchResult<()>;
}

/// Static type -> handler mapping, built once at startup (no plugin
/// loading; registration is explicit, per §9).
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<JobType, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, job_type: JobType, handler: Arc<dyn Handler>) {
        self.handlers.insert(job_type, handler);
    }

    pub fn get(&self, job_type: JobType) -> Option<Arc<dyn Handler>> {
        self.handlers.get(&job_type).cloned()
    }

    /// Run the full `initialize` + `execute` lifecycle for a record.
    /// An unregistered job type surfaces `DispatchError::UnknownJobType`,
    /// which the dispatcher logs and drops without retry (§4.5).
    pub async fn dispatch(&self, record: &DispatchRecord) -> DispatchResult<()> {
        let handler = self
            .get(record.job_type)
            .ok_or_else(|| DispatchError::UnknownJobType(record.job_type.to_string()))?;
        handler.initialize(record)?;
        handler.execute(record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Payload;
    use chrono::Utc;

    struct AlwaysOk;

    #[async_trait]
    impl Handler for AlwaysOk {
        async fn execute(&self, _record: &DispatchRecord) -> DispatchResult<()> {
            Ok(())
        }
    }

    struct AlwaysFail;

    #[async_trait]
    impl Handler for AlwaysFail {
        async fn execute(&self, record: &DispatchRecord) -> DispatchResult<()> {
            Err(DispatchError::HandlerFailure {
                job_id: record.job_id,
                reason: "simulated failure".into(),
            })
        }
    }

    fn record(job_type: JobType) -> DispatchRecord {
        DispatchRecord::new(
            1,
            job_type,
            Payload {
                data: "d".into(),
                message: "m".into(),
            },
            Utc::now(),
            crate::record::Priority::High,
        )
    }

    #[tokio::test]
    async fn unregistered_type_is_unknown_job_type() {
        let registry = HandlerRegistry::new();
        let err = registry.dispatch(&record(JobType::Email)).await.unwrap_err();
        assert!(matches!(err, DispatchError::UnknownJobType(_)));
    }

    #[tokio::test]
    async fn registered_handler_runs() {
        let mut registry = HandlerRegistry::new();
        registry.register(JobType::Email, Arc::new(AlwaysOk));
        registry.dispatch(&record(JobType::Email)).await.unwrap();
    }

    #[tokio::test]
    async fn handler_failure_propagates() {
        let mut registry = HandlerRegistry::new();
        registry.register(JobType::Webhook, Arc::new(AlwaysFail));
        let err = registry
            .dispatch(&record(JobType::Webhook))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::HandlerFailure { .. }));
    }
}
