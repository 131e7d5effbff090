use axum::routing::get;
use axum::Router;
use dispatch_core::metrics::render_metrics;

/// Liveness endpoint and the Prometheus scrape surface. Deliberately
/// minimal: this worker has no HTTP business surface, only the ambient
/// health/metrics one every service in this workspace carries.
pub fn router() -> Router {
    Router::new()
        .route("/apis/v1/healthz", get(healthz))
        .route("/metrics", get(metrics_handler))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn metrics_handler() -> String {
    render_metrics()
}
