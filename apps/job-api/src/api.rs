use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use domain_jobs::{JobFilter, JobResult, SubmitJobRequest};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/apis/v1/submit-job", post(submit_job))
        .route("/apis/v1/jobs", get(list_jobs))
        .route("/apis/v1/job/{id}", get(get_job))
        .route("/apis/v1/healthz", get(healthz))
}

async fn submit_job(
    State(state): State<AppState>,
    Json(request): Json<SubmitJobRequest>,
) -> JobResult<impl IntoResponse> {
    let job = state.jobs.submit(request).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

async fn list_jobs(
    State(state): State<AppState>,
    Query(filter): Query<JobFilter>,
) -> JobResult<impl IntoResponse> {
    let jobs = state.jobs.list(filter.q).await?;
    Ok(Json(jobs))
}

async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> JobResult<impl IntoResponse> {
    let job = state.jobs.get(id).await?;
    Ok(Json(job))
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    database: bool,
    redis: bool,
}

async fn healthz(State(mut state): State<AppState>) -> impl IntoResponse {
    let database = database::postgres::check_health(&state.db).await.is_ok();
    let redis = database::redis::check_health(&mut state.redis).await.is_ok();

    let status = if database && redis {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthBody {
            status: if database && redis { "ok" } else { "degraded" },
            database,
            redis,
        }),
    )
}
