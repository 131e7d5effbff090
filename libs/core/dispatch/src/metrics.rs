use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Instant;

use crate::record::Priority;

pub mod names {
    pub const JOBS_POLLED_TOTAL: &str = "dispatch_jobs_polled_total";
    pub const JOBS_DISPATCHED_TOTAL: &str = "dispatch_jobs_dispatched_total";
    pub const JOBS_SUCCEEDED_TOTAL: &str = "dispatch_jobs_succeeded_total";
    pub const JOBS_RETRIED_TOTAL: &str = "dispatch_jobs_retried_total";
    pub const JOBS_DROPPED_TOTAL: &str = "dispatch_jobs_dropped_total";
    pub const READY_INDEX_DEPTH: &str = "dispatch_ready_index_depth";
    pub const HANDLER_DURATION_SECONDS: &str = "dispatch_handler_duration_seconds";
}

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the process-global Prometheus recorder. Safe to call more than
/// once (subsequent calls are no-ops); mirrors the idempotent-init pattern
/// used by `core_config::tracing::init_tracing`.
pub fn init_metrics() {
    if HANDLE.get().is_some() {
        return;
    }
    if let Ok(handle) = PrometheusBuilder::new().install_recorder() {
        let _ = HANDLE.set(handle);
    }
}

/// Render the current metrics snapshot as Prometheus text exposition
/// format, for the `/metrics` health-surface route.
pub fn render_metrics() -> String {
    HANDLE
        .get()
        .map(|h| h.render())
        .unwrap_or_else(|| "# metrics recorder not initialized\n".to_string())
}

pub fn record_polled(priority: Priority, count: usize) {
    counter!(names::JOBS_POLLED_TOTAL, "priority" => priority.to_string()).increment(count as u64);
}

pub fn record_dispatched(priority: Priority) {
    counter!(names::JOBS_DISPATCHED_TOTAL, "priority" => priority.to_string()).increment(1);
}

pub fn record_succeeded(priority: Priority, job_type: &str) {
    counter!(
        names::JOBS_SUCCEEDED_TOTAL,
        "priority" => priority.to_string(),
        "type" => job_type.to_string(),
    )
    .increment(1);
}

pub fn record_retried(priority: Priority) {
    counter!(names::JOBS_RETRIED_TOTAL, "priority" => priority.to_string()).increment(1);
}

pub fn record_dropped(priority: Priority, reason: &'static str) {
    counter!(
        names::JOBS_DROPPED_TOTAL,
        "priority" => priority.to_string(),
        "reason" => reason,
    )
    .increment(1);
}

pub fn set_ready_index_depth(priority: Priority, depth: usize) {
    gauge!(names::READY_INDEX_DEPTH, "priority" => priority.to_string()).set(depth as f64);
}

/// RAII timer recording a handler's execution duration on drop, mirroring
/// the stream-worker metrics timer pattern.
pub struct HandlerTimer {
    job_type: &'static str,
    start: Instant,
}

impl HandlerTimer {
    pub fn start(job_type: &'static str) -> Self {
        Self {
            job_type,
            start: Instant::now(),
        }
    }
}

impl Drop for HandlerTimer {
    fn drop(&mut self) {
        histogram!(names::HANDLER_DURATION_SECONDS, "type" => self.job_type)
            .record(self.start.elapsed().as_secs_f64());
    }
}
