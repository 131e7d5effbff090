//! Job submission HTTP API.
//!
//! Exposes the submit/list/get surface backed by `domain_jobs::JobService`
//! and a health endpoint that pings both Postgres and Redis.

mod api;
mod config;
mod state;

use std::sync::Arc;

use axum::Router;
use core_config::tracing::init_tracing;
use database::postgres::connect_from_config_with_retry as connect_pg_with_retry;
use database::redis::connect_from_config_with_retry as connect_redis_with_retry;
use dispatch_core::{ReadyIndex, RedisReadyIndex};
use eyre::WrapErr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install().ok();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("starting job-api");

    let db = connect_pg_with_retry(config.database.clone(), None)
        .await
        .wrap_err("failed to connect to PostgreSQL")?;

    let redis = connect_redis_with_retry(config.redis.clone(), None)
        .await
        .wrap_err("failed to connect to Redis")?;

    let index: Arc<dyn ReadyIndex> = Arc::new(RedisReadyIndex::new(redis.clone()));
    let state = AppState::new(config.clone(), db, redis, index);

    let app = Router::new()
        .merge(api::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.server.address();
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("failed to bind {addr}"))?;

    info!(%addr, "job-api listening");
    axum::serve(listener, app)
        .await
        .wrap_err("job-api server failed")?;

    Ok(())
}
