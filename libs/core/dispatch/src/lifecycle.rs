use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

/// The four states of the pipeline lifecycle (governing design document
/// §4.7). Transitions are one-directional: `Starting -> Running ->
/// Draining -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Running,
    Draining,
    Stopped,
}

/// Single process-wide cancellation primitive, observed at every suspension
/// point (ticker wait, ready-index round trip, channel send/receive, pool
/// submit). Backed by a `watch` channel so every poller, the dispatcher, and
/// the pool can each hold their own cheaply-cloned receiver.
#[derive(Clone)]
pub struct CancellationToken {
    tx: watch::Sender<bool>,
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            tx,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Fire cancellation. Idempotent: a second call is a no-op.
    pub fn cancel(&self) {
        if self
            .cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("dispatch pipeline cancellation fired");
            let _ = self.tx.send(true);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Wait for SIGINT or, on unix, SIGTERM, then cancel. Intended to be
    /// spawned once by the owning binary's lifecycle driver.
    pub async fn wait_for_signal_and_cancel(&self) {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("received SIGINT, entering draining state"),
            _ = terminate => info!("received SIGTERM, entering draining state"),
        }

        self.cancel();
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_idempotent_and_observable() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn subscribers_observe_cancellation() {
        let token = CancellationToken::new();
        let mut signal = token.subscribe();
        token.cancel();
        signal.changed().await.unwrap();
        assert!(*signal.borrow());
    }

    #[test]
    fn states_are_ordered_one_directionally() {
        let states = [
            LifecycleState::Starting,
            LifecycleState::Running,
            LifecycleState::Draining,
            LifecycleState::Stopped,
        ];
        assert_eq!(states.len(), 4);
    }
}
