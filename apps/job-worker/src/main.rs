//! Dispatch pipeline worker.
//!
//! Bootstraps the ready index, the handler registry, the worker pool, the
//! three per-priority pollers, and the fan-in dispatcher, then runs until a
//! shutdown signal fires the shared cancellation token.

mod health;

use std::sync::Arc;

use axum::Router;
use core_config::tracing::init_tracing;
use core_config::{Environment, FromEnv};
use database::postgres::connect_from_config_with_retry as connect_pg_with_retry;
use database::postgres::PostgresConfig;
use database::redis::connect_from_config_with_retry as connect_redis_with_retry;
use database::redis::RedisConfig;
use dispatch_core::{
    CancellationToken, Dispatcher, DispatchConfig, HandlerRegistry, Poller, ReadyIndex,
    RedisReadyIndex, StatusSink, WorkerPool,
};
use domain_jobs::{
    EmailHandler, MessageHandler, PgJobRepository, RepositoryStatusSink, WebhookHandler,
};
use eyre::WrapErr;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;

async fn start_health_server(port: u16) -> eyre::Result<()> {
    let app: Router = health::router();
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("failed to bind health server to {addr}"))?;
    info!(%addr, "health and metrics server listening");
    axum::serve(listener, app)
        .await
        .wrap_err("health server failed")?;
    Ok(())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install().ok();

    let environment = Environment::from_env();
    init_tracing(&environment);
    dispatch_core::metrics::init_metrics();

    info!("starting job-worker");

    let dispatch_config =
        DispatchConfig::from_env().wrap_err("failed to load dispatch pipeline configuration")?;

    let pg_config = PostgresConfig::from_env().wrap_err("failed to load PostgreSQL configuration")?;
    // Durable storage is owned by the HTTP submission surface; the worker
    // only ever reaches it to mark a record completed/failed once its
    // handler has run, never to read the ready index.
    let db = connect_pg_with_retry(pg_config, None)
        .await
        .wrap_err("failed to connect to PostgreSQL")?;
    let status: Arc<dyn StatusSink> =
        Arc::new(RepositoryStatusSink::new(Arc::new(PgJobRepository::new(db))));

    let redis_config = RedisConfig::from_env().wrap_err("failed to load Redis configuration")?;
    let redis = connect_redis_with_retry(redis_config, None)
        .await
        .wrap_err("failed to connect to Redis")?;

    let index: Arc<dyn ReadyIndex> = Arc::new(RedisReadyIndex::new(redis));

    let mut registry = HandlerRegistry::new();
    registry.register(dispatch_core::JobType::Email, Arc::new(EmailHandler));
    registry.register(dispatch_core::JobType::Message, Arc::new(MessageHandler));
    registry.register(dispatch_core::JobType::Webhook, Arc::new(WebhookHandler));
    let registry = Arc::new(registry);

    let pool = Arc::new(WorkerPool::new(dispatch_config.pool_size));
    let cancel = CancellationToken::new();

    let (high_tx, high_rx) = mpsc::channel(dispatch_config.batch_size);
    let (medium_tx, medium_rx) = mpsc::channel(dispatch_config.batch_size);
    let (low_tx, low_rx) = mpsc::channel(dispatch_config.batch_size);

    let high_poller = Poller::new(
        dispatch_core::Priority::High,
        index.clone(),
        dispatch_config.clone(),
        high_tx,
        cancel.subscribe(),
    );
    let medium_poller = Poller::new(
        dispatch_core::Priority::Medium,
        index.clone(),
        dispatch_config.clone(),
        medium_tx,
        cancel.subscribe(),
    );
    let low_poller = Poller::new(
        dispatch_core::Priority::Low,
        index.clone(),
        dispatch_config.clone(),
        low_tx,
        cancel.subscribe(),
    );

    tokio::spawn(high_poller.run());
    tokio::spawn(medium_poller.run());
    tokio::spawn(low_poller.run());

    let health_port: u16 = std::env::var("HEALTH_PORT")
        .unwrap_or_else(|_| "8082".to_string())
        .parse()
        .unwrap_or(8082);
    tokio::spawn(async move {
        if let Err(e) = start_health_server(health_port).await {
            tracing::error!(error = %e, "health server exited");
        }
    });

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        signal_cancel.wait_for_signal_and_cancel().await;
    });

    let dispatcher = Dispatcher::new(index, dispatch_config, registry, pool.clone(), Some(status));
    dispatcher.run(high_rx, medium_rx, low_rx).await;

    pool.stop_and_wait().await;
    info!("job-worker stopped");
    Ok(())
}
