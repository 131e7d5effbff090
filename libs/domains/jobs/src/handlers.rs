use async_trait::async_trait;
use dispatch_core::{DispatchError, DispatchRecord, DispatchResult, Handler};
use rand::Rng;

/// Simulated I/O success rate for a handler (governing design document
/// §4.5). Real handlers would call out to an SMTP gateway, a chat API, or
/// an HTTP endpoint; these stand in for that I/O with a fixed probability
/// of failure so the retry ladder has something to exercise.
fn simulate(job_id: i64, success_rate: f64) -> DispatchResult<()> {
    let roll: f64 = rand::rng().random_range(0.0..1.0);
    if roll < success_rate {
        Ok(())
    } else {
        Err(DispatchError::HandlerFailure {
            job_id,
            reason: "simulated downstream failure".to_string(),
        })
    }
}

/// Handles `Email` jobs. 60% simulated success rate.
pub struct EmailHandler;

#[async_trait]
impl Handler for EmailHandler {
    async fn execute(&self, record: &DispatchRecord) -> DispatchResult<()> {
        tracing::debug!(job_id = record.job_id, to = %record.payload.data, "sending email");
        simulate(record.job_id, 0.60)
    }
}

/// Handles `Message` jobs. 80% simulated success rate.
pub struct MessageHandler;

#[async_trait]
impl Handler for MessageHandler {
    async fn execute(&self, record: &DispatchRecord) -> DispatchResult<()> {
        tracing::debug!(job_id = record.job_id, to = %record.payload.data, "sending message");
        simulate(record.job_id, 0.80)
    }
}

/// Handles `Webhook` jobs. 95% simulated success rate.
pub struct WebhookHandler;

#[async_trait]
impl Handler for WebhookHandler {
    async fn execute(&self, record: &DispatchRecord) -> DispatchResult<()> {
        tracing::debug!(job_id = record.job_id, url = %record.payload.data, "calling webhook");
        simulate(record.job_id, 0.95)
    }
}
