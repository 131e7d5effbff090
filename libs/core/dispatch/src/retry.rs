use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::DispatchConfig;
use crate::index::ReadyIndex;
use crate::record::DispatchRecord;

/// Outcome of applying the retry/backoff policy to a failed record
/// (governing design document §4.6). Exposed for tests and metrics; the
/// dispatcher itself only needs `handle_failure`.
#[derive(Debug, PartialEq, Eq)]
pub enum RetryOutcome {
    /// Re-inserted into the ready index at the given retry count.
    Rescheduled { retries: u32 },
    /// Retries exhausted; the record is dropped.
    Dropped,
}

/// Apply the exponential backoff ladder to a record that just failed
/// execution. `now` is injected for testability.
pub async fn handle_failure(
    index: &dyn ReadyIndex,
    config: &DispatchConfig,
    mut record: DispatchRecord,
    now: DateTime<Utc>,
) -> RetryOutcome {
    let next_retries = record.retries + 1;

    if next_retries > config.max_retries {
        info!(
            job_id = record.job_id,
            priority = %record.priority,
            retries = record.retries,
            "max retries reached, dropping record"
        );
        return RetryOutcome::Dropped;
    }

    record.retries = next_retries;
    let delay = config.backoff_for(next_retries);
    record.execution_at = now + chrono::Duration::from_std(delay).expect("backoff fits in i64");

    let priority = record.priority;
    let score = record.score();
    let blob = match record.to_blob() {
        Ok(blob) => blob,
        Err(e) => {
            warn!(job_id = record.job_id, error = %e, "failed to serialize record for retry, dropping");
            return RetryOutcome::Dropped;
        }
    };

    if let Err(e) = index.add(priority, &blob, score).await {
        warn!(
            job_id = record.job_id,
            priority = %priority,
            error = %e,
            "retry re-insertion failed, job is lost"
        );
    }

    RetryOutcome::Rescheduled {
        retries: next_retries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MockReadyIndex;
    use crate::record::{JobType, Payload, Priority};
    use chrono::Utc;

    fn record(retries: u32) -> DispatchRecord {
        let mut r = DispatchRecord::new(
            7,
            JobType::Webhook,
            Payload {
                data: "d".into(),
                message: "m".into(),
            },
            Utc::now(),
            Priority::Medium,
        );
        r.retries = retries;
        r
    }

    #[tokio::test]
    async fn reschedules_with_advancing_backoff() {
        let mut mock = MockReadyIndex::new();
        let now = Utc::now();
        mock.expect_add()
            .withf(move |_, _, score| {
                let expected = (now + chrono::Duration::seconds(10)).timestamp() as f64;
                (*score - expected).abs() < 1.0
            })
            .returning(|_, _, _| Ok(()));

        let config = DispatchConfig::default();
        let outcome = handle_failure(&mock, &config, record(0), now).await;
        assert_eq!(outcome, RetryOutcome::Rescheduled { retries: 1 });
    }

    #[tokio::test]
    async fn drops_after_max_retries() {
        let mock = MockReadyIndex::new();
        let config = DispatchConfig::default();
        let outcome = handle_failure(&mock, &config, record(5), Utc::now()).await;
        assert_eq!(outcome, RetryOutcome::Dropped);
    }

    #[tokio::test]
    async fn reinsertion_failure_is_swallowed_not_propagated() {
        let mut mock = MockReadyIndex::new();
        mock.expect_add()
            .returning(|_, _, _| Err(crate::error::DispatchError::Validation("boom".into())));
        let config = DispatchConfig::default();
        let outcome = handle_failure(&mock, &config, record(0), Utc::now()).await;
        assert_eq!(outcome, RetryOutcome::Rescheduled { retries: 1 });
    }
}
