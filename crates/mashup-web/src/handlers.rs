//! HTTP request handlers

use crate::jobs::{CancelOutcome, Job, JobState};
use crate::server::AppContext;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateMashupRequest {
    pub singer: String,
    pub n_videos: u32,
    pub trim_duration: i64,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CreateMashupResponse {
    pub job_id: Uuid,
    pub status: String,
    pub status_url: String,
    pub download_url: String,
}

/// GET / - Request form
pub async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "mashup-web".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /mashups - Validate a request and queue it as a job
pub async fn create_mashup(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateMashupRequest>,
) -> Result<(StatusCode, Json<CreateMashupResponse>), (StatusCode, Json<ErrorResponse>)> {
    if let Err(message) = validate_request(&req) {
        warn!("Rejected mashup request: {}", message);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: message }),
        ));
    }

    let job = ctx
        .store
        .submit(
            req.singer.trim(),
            req.n_videos,
            req.trim_duration as u64,
            &req.email,
        )
        .map_err(|e| {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
        })?;

    info!("Accepted job {} for {}", job.id, job.singer);
    Ok((
        StatusCode::ACCEPTED,
        Json(CreateMashupResponse {
            job_id: job.id,
            status: "queued".to_string(),
            status_url: format!("/mashups/{}", job.id),
            download_url: format!("/mashups/{}/download", job.id),
        }),
    ))
}

/// GET /mashups/:id - Job status
pub async fn mashup_status(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, (StatusCode, Json<ErrorResponse>)> {
    ctx.store.get(id).map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("no such job: {}", id),
            }),
        )
    })
}

/// DELETE /mashups/:id - Cancel a job that has not started yet
pub async fn cancel_mashup(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    match ctx.store.cancel(id) {
        CancelOutcome::Cancelled => {
            info!("Cancelled job {}", id);
            Ok(Json(StatusResponse {
                status: "cancelled".to_string(),
            }))
        }
        CancelOutcome::NotCancellable(state) => Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("job is {}; only queued jobs can be cancelled", state),
            }),
        )),
        CancelOutcome::NotFound => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("no such job: {}", id),
            }),
        )),
    }
}

/// GET /mashups/:id/download - The merged file of a completed job
pub async fn download_mashup(State(ctx): State<AppContext>, Path(id): Path<Uuid>) -> Response {
    let Some(job) = ctx.store.get(id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("no such job: {}", id),
            }),
        )
            .into_response();
    };

    if !matches!(job.state, JobState::Completed { .. }) {
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "job has not completed yet".to_string(),
            }),
        )
            .into_response();
    }

    match tokio::fs::read(&job.output).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "audio/wav".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"mashup-{}.wav\"", job.id),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("failed to read output: {}", e),
            }),
        )
            .into_response(),
    }
}

/// Mirror of the CLI argument checks, plus the email format gate
fn validate_request(req: &CreateMashupRequest) -> Result<(), String> {
    if req.singer.trim().is_empty() {
        return Err("singer must not be empty".to_string());
    }
    if req.n_videos == 0 {
        return Err("n_videos must be at least 1".to_string());
    }
    if req.trim_duration <= 0 {
        return Err("trim_duration must be a positive number of seconds".to_string());
    }
    if !is_valid_email(&req.email) {
        return Err(format!("invalid email address: {}", req.email));
    }
    Ok(())
}

fn is_valid_email(address: &str) -> bool {
    address.parse::<email_address::EmailAddress>().is_ok()
}
