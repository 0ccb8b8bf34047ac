//! API handlers for the dispatch server.

use crate::jobs::JobRecord;
use crate::AppState;
use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Request body for job dispatch.
#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    /// The room the assistant should join.
    #[serde(rename = "roomName")]
    pub room_name: String,
}

/// Response body for successful dispatch.
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    /// The assigned job ID.
    #[serde(rename = "jobId")]
    pub job_id: Uuid,
}

/// API error type mapping to HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Handler for `POST /jobs`.
pub async fn dispatch_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<DispatchRequest>,
) -> Result<Json<DispatchResponse>, ApiError> {
    let room_name = payload.room_name.trim();
    if room_name.is_empty() {
        return Err(ApiError::BadRequest("roomName must not be empty".to_string()));
    }

    let job_id = state
        .jobs
        .dispatch(state.assistant.clone(), room_name.to_string())
        .await;

    tracing::info!(job = %job_id, room = %room_name, "dispatched assistant job");

    Ok(Json(DispatchResponse { job_id }))
}

/// Handler for `GET /jobs`.
pub async fn list_jobs_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<Vec<JobRecord>> {
    Json(state.jobs.list().await)
}

/// Handler for `GET /jobs/{id}`.
pub async fn get_job_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRecord>, ApiError> {
    state
        .jobs
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("job not found: {}", id)))
}

/// Handler for `DELETE /jobs/{id}`.
pub async fn cancel_job_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.jobs.cancel(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("no running job: {}", id)))
    }
}
