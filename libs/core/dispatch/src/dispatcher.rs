use chrono::Utc;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::DispatchConfig;
use crate::error::DispatchError;
use crate::index::ReadyIndex;
use crate::metrics;
use crate::pool::WorkerPool;
use crate::record::DispatchRecord;
use crate::registry::HandlerRegistry;
use crate::retry::{self, RetryOutcome};
use crate::status::StatusSink;

/// Single fan-in task multiplexing the three priority channels into the
/// worker pool (governing design document §4.3). Priority is enforced
/// statistically via the pollers' rate asymmetry rather than explicit
/// biasing in the multiplex (`tokio::select!`'s documented pseudo-random
/// branch selection is left as-is, matching the reference's non-strict
/// priority dispatch — see the Open Question decision recorded alongside
/// the project's design ledger).
pub struct Dispatcher {
    index: Arc<dyn ReadyIndex>,
    config: DispatchConfig,
    registry: Arc<HandlerRegistry>,
    pool: Arc<WorkerPool>,
    status: Option<Arc<dyn StatusSink>>,
}

impl Dispatcher {
    pub fn new(
        index: Arc<dyn ReadyIndex>,
        config: DispatchConfig,
        registry: Arc<HandlerRegistry>,
        pool: Arc<WorkerPool>,
        status: Option<Arc<dyn StatusSink>>,
    ) -> Self {
        Self {
            index,
            config,
            registry,
            pool,
            status,
        }
    }

    /// Multiplex until all three channels are closed and drained.
    pub async fn run(
        &self,
        mut high: mpsc::Receiver<DispatchRecord>,
        mut medium: mpsc::Receiver<DispatchRecord>,
        mut low: mpsc::Receiver<DispatchRecord>,
    ) {
        let mut high_alive = true;
        let mut medium_alive = true;
        let mut low_alive = true;

        while high_alive || medium_alive || low_alive {
            let received = tokio::select! {
                r = high.recv(), if high_alive => {
                    if r.is_none() { high_alive = false; }
                    r
                }
                r = medium.recv(), if medium_alive => {
                    if r.is_none() { medium_alive = false; }
                    r
                }
                r = low.recv(), if low_alive => {
                    if r.is_none() { low_alive = false; }
                    r
                }
            };

            if let Some(record) = received {
                self.dispatch_one(record).await;
            }
        }

        info!("dispatcher exiting: all priority channels closed and drained");
    }

    async fn dispatch_one(&self, record: DispatchRecord) {
        let priority = record.priority;
        metrics::record_dispatched(priority);

        let index = self.index.clone();
        let config = self.config.clone();
        let registry = self.registry.clone();
        let status = self.status.clone();

        let submitted = self
            .pool
            .submit(async move {
                let job_id = record.job_id;
                let job_type = record.job_type;
                let _timer = metrics::HandlerTimer::start(job_type.as_str());

                match registry.dispatch(&record).await {
                    Ok(()) => {
                        metrics::record_succeeded(priority, job_type.as_str());
                        info!(job_id, %priority, job_type = job_type.as_str(), "job succeeded");
                        if let Some(sink) = &status {
                            sink.mark_completed(job_id).await;
                        }
                    }
                    Err(DispatchError::UnknownJobType(t)) => {
                        warn!(job_id, %priority, job_type = %t, "no handler registered, dropping");
                        metrics::record_dropped(priority, "unknown_type");
                        if let Some(sink) = &status {
                            sink.mark_failed(job_id).await;
                        }
                    }
                    Err(DispatchError::HandlerFailure { .. }) => {
                        metrics::record_retried(priority);
                        let outcome = retry::handle_failure(index.as_ref(), &config, record, Utc::now()).await;
                        if outcome == RetryOutcome::Dropped {
                            metrics::record_dropped(priority, "retries_exhausted");
                            if let Some(sink) = &status {
                                sink.mark_failed(job_id).await;
                            }
                        }
                    }
                    Err(e) => {
                        warn!(job_id, %priority, error = %e, "unexpected dispatch error, dropping");
                        metrics::record_dropped(priority, "error");
                        if let Some(sink) = &status {
                            sink.mark_failed(job_id).await;
                        }
                    }
                }
            })
            .await;

        if let Err(e) = submitted {
            warn!(priority = %priority, error = %e, "worker pool rejected submit");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MockReadyIndex;
    use crate::record::{JobType, Payload, Priority};
    use crate::registry::Handler;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler(Arc<AtomicUsize>);

    #[async_trait]
    impl Handler for CountingHandler {
        async fn execute(&self, _record: &DispatchRecord) -> Result<(), DispatchError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn drains_all_channels_then_exits() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry.register(JobType::Email, Arc::new(CountingHandler(counter.clone())));

        let dispatcher = Dispatcher::new(
            Arc::new(MockReadyIndex::new()),
            DispatchConfig::default(),
            Arc::new(registry),
            Arc::new(WorkerPool::new(4)),
            None,
        );

        let (high_tx, high_rx) = mpsc::channel(4);
        let (medium_tx, medium_rx) = mpsc::channel(4);
        let (low_tx, low_rx) = mpsc::channel(4);

        let record = DispatchRecord::new(
            1,
            JobType::Email,
            Payload {
                data: "d".into(),
                message: "m".into(),
            },
            Utc::now(),
            Priority::High,
        );
        high_tx.send(record).await.unwrap();
        drop(high_tx);
        drop(medium_tx);
        drop(low_tx);

        dispatcher.run(high_rx, medium_rx, low_rx).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn status_sink_reflects_success_and_unknown_type_drop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry.register(JobType::Email, Arc::new(CountingHandler(counter.clone())));

        let mut status = crate::status::MockStatusSink::new();
        status
            .expect_mark_completed()
            .times(1)
            .withf(|job_id| *job_id == 1)
            .returning(|_| ());
        status
            .expect_mark_failed()
            .times(1)
            .withf(|job_id| *job_id == 2)
            .returning(|_| ());

        let dispatcher = Dispatcher::new(
            Arc::new(MockReadyIndex::new()),
            DispatchConfig::default(),
            Arc::new(registry),
            Arc::new(WorkerPool::new(4)),
            Some(Arc::new(status)),
        );

        let (high_tx, high_rx) = mpsc::channel(4);
        let (medium_tx, medium_rx) = mpsc::channel(4);
        let (low_tx, low_rx) = mpsc::channel(4);

        let succeeds = DispatchRecord::new(
            1,
            JobType::Email,
            Payload {
                data: "d".into(),
                message: "m".into(),
            },
            Utc::now(),
            Priority::High,
        );
        // No handler registered for Webhook: dispatch_one drops it and
        // marks it failed rather than completed.
        let unknown = DispatchRecord::new(
            2,
            JobType::Webhook,
            Payload {
                data: "d".into(),
                message: "m".into(),
            },
            Utc::now(),
            Priority::Low,
        );
        high_tx.send(succeeds).await.unwrap();
        low_tx.send(unknown).await.unwrap();
        drop(high_tx);
        drop(medium_tx);
        drop(low_tx);

        dispatcher.run(high_rx, medium_rx, low_rx).await;
    }
}
