//! Import job routes
//!
//! Public read-only routes for operators to inspect import outcomes.
//! These endpoints do NOT allow triggering or retrying jobs.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::queries::{
    get_job::handle as handle_get_job, list_jobs::handle as handle_list_jobs, GetJobError,
    GetJobQuery, ListJobsError, ListJobsQuery,
};
use crate::error::{AppError, AppResult};

/// Create import job routes
pub fn jobs_routes() -> Router<PgPool> {
    Router::new()
        .route("/", get(list_jobs))
        .route("/:job_id", get(get_job))
}

/// List import jobs
///
/// GET /import-jobs?status=failed&bank_type=acme&limit=50&offset=0
async fn list_jobs(
    State(db): State<PgPool>,
    Query(query): Query<ListJobsQuery>,
) -> AppResult<Response> {
    let response = handle_list_jobs(db, query).await.map_err(|e| match e {
        ListJobsError::InvalidStatus(status) => {
            AppError::BadRequest(format!("invalid status filter: {status:?}"))
        },
        ListJobsError::Database(e) => AppError::Database(e),
    })?;

    Ok((StatusCode::OK, Json(json!(response))).into_response())
}

/// Get a specific import job by id
///
/// GET /import-jobs/:job_id
async fn get_job(State(db): State<PgPool>, Path(job_id): Path<Uuid>) -> AppResult<Response> {
    let job = handle_get_job(db, GetJobQuery { job_id })
        .await
        .map_err(|e| match e {
            GetJobError::NotFound(id) => AppError::NotFound(format!("import job {id} not found")),
            GetJobError::Database(e) => AppError::Database(e),
        })?;

    Ok((StatusCode::OK, Json(json!(job))).into_response())
}
