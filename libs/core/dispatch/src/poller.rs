use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::config::DispatchConfig;
use crate::index::ReadyIndex;
use crate::metrics;
use crate::record::{DispatchRecord, Priority};

/// Per-priority loop draining due records into a bounded hand-off channel
/// (governing design document §4.2). One `Poller` per `Priority`; each owns
/// its own ticker, its own write half of the priority channel, and a
/// cancellation signal shared with every other pipeline component.
pub struct Poller {
    priority: Priority,
    index: Arc<dyn ReadyIndex>,
    config: DispatchConfig,
    tx: mpsc::Sender<DispatchRecord>,
    cancel: watch::Receiver<bool>,
}

impl Poller {
    pub fn new(
        priority: Priority,
        index: Arc<dyn ReadyIndex>,
        config: DispatchConfig,
        tx: mpsc::Sender<DispatchRecord>,
        cancel: watch::Receiver<bool>,
    ) -> Self {
        Self {
            priority,
            index,
            config,
            tx,
            cancel,
        }
    }

    fn interval(&self) -> Duration {
        match self.priority {
            Priority::High => self.config.high_poll_interval,
            Priority::Medium => self.config.medium_poll_interval,
            Priority::Low => self.config.low_poll_interval,
        }
    }

    /// Run until cancellation. The channel's write half (`self.tx`) is
    /// dropped when this future completes, so the channel closes only
    /// after the last in-flight send has finished (§4.2 termination).
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if *self.cancel.borrow() {
                        break;
                    }
                    self.tick().await;
                }
                changed = self.cancel.changed() => {
                    if changed.is_err() || *self.cancel.borrow() {
                        break;
                    }
                }
            }
        }

        info!(priority = %self.priority, "poller exiting");
    }

    async fn tick(&mut self) {
        let now = Utc::now();
        let due = match self
            .index
            .range_due(self.priority, now.timestamp() as f64, self.config.batch_size)
            .await
        {
            Ok(due) => due,
            Err(e) => {
                warn!(priority = %self.priority, error = %e, "range_due failed, retrying next tick");
                return;
            }
        };

        metrics::record_polled(self.priority, due.len());

        match self.index.depth(self.priority).await {
            Ok(depth) => metrics::set_ready_index_depth(self.priority, depth),
            Err(e) => warn!(priority = %self.priority, error = %e, "failed to sample ready index depth"),
        }

        for blob in due {
            let record = match DispatchRecord::from_blob(&blob) {
                Ok(record) => record,
                Err(e) => {
                    // Left un-removed by design: the source only removes on
                    // successful hand-off. A malformed blob is logged and
                    // skipped, and will be re-attempted (and re-skipped) on
                    // every future tick.
                    warn!(priority = %self.priority, error = %e, "failed to deserialize dispatch record, skipping");
                    continue;
                }
            };

            tokio::select! {
                send_result = self.tx.send(record) => {
                    match send_result {
                        Ok(()) => {
                            if let Err(e) = self.index.remove(self.priority, &blob).await {
                                warn!(priority = %self.priority, error = %e, "failed to remove drained record, may re-deliver");
                            }
                        }
                        Err(_) => {
                            warn!(priority = %self.priority, "dispatcher gone, abandoning tick");
                            return;
                        }
                    }
                }
                changed = self.cancel.changed() => {
                    if changed.is_err() || *self.cancel.borrow() {
                        return;
                    }
                }
            }
        }
    }
}
