use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::warn;

use crate::error::{DispatchError, DispatchResult};

/// Bounded worker pool executing handler-lifecycle tasks (governing design
/// document §4.4). Mirrors the reference implementation's single combined
/// pool of `POOL_SIZE` workers serving all priorities (see the Open
/// Question decision recorded in the project's design ledger), and the
/// `pond.v2`-style `submit`/`stop_and_wait` contract it was originally
/// expressed with.
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    tasks: Mutex<JoinSet<()>>,
    stopped: AtomicBool,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(size)),
            tasks: Mutex::new(JoinSet::new()),
            stopped: AtomicBool::new(false),
        }
    }

    /// Enqueue a nullary task. Blocks while the pool is at capacity,
    /// exerting backpressure on the dispatcher (and transitively on the
    /// pollers through the priority channels). Rejected with
    /// `DispatchError::PoolStopped` once `stop_and_wait` has been called.
    pub async fn submit<F>(&self, task: F) -> DispatchResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.stopped.load(Ordering::SeqCst) {
            return Err(DispatchError::PoolStopped);
        }

        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("worker pool semaphore is never closed before stop_and_wait");

        // Re-check under the same lock stop_and_wait drains with: a
        // concurrent stop_and_wait that stores the flag and then wins the
        // race for this lock must be visible here before we ever spawn.
        let mut tasks = self.tasks.lock().await;
        if self.stopped.load(Ordering::SeqCst) {
            drop(permit);
            return Err(DispatchError::PoolStopped);
        }

        tasks.spawn(async move {
            task.await;
            drop(permit);
        });
        Ok(())
    }

    /// Close admission and wait for every previously accepted task to
    /// finish. No task may begin after this call returns.
    pub async fn stop_and_wait(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        let mut tasks = self.tasks.lock().await;
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "worker pool task panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn runs_submitted_tasks() {
        let pool = WorkerPool::new(4);
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..10 {
            let counter = counter.clone();
            pool.submit(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();
        }
        pool.stop_and_wait().await;
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn rejects_submit_after_stop() {
        let pool = WorkerPool::new(2);
        pool.stop_and_wait().await;
        let err = pool.submit(async {}).await.unwrap_err();
        assert!(matches!(err, DispatchError::PoolStopped));
    }

    #[tokio::test]
    async fn caps_concurrency_at_pool_size() {
        let pool = Arc::new(WorkerPool::new(2));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        for _ in 0..6 {
            let in_flight = in_flight.clone();
            let max_seen = max_seen.clone();
            pool.submit(async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            })
            .await
            .unwrap();
        }
        pool.stop_and_wait().await;
        assert!(max_seen.load(Ordering::SeqCst) <= 2);
    }
}
