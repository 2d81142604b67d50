//! Storage event routes
//!
//! `POST /events/s3` receives S3 "object created" notifications (via an SNS
//! HTTP subscription or a forwarding function) and extracts the uploaded
//! document into `txt/`.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::error::{AppError, Result};
use crate::ingest::{IngestReport, S3Event};
use crate::state::AppState;

/// Create the events router
pub fn router() -> Router<AppState> {
    Router::new().route("/s3", post(object_created))
}

async fn object_created(
    State(state): State<AppState>,
    payload: std::result::Result<Json<S3Event>, JsonRejection>,
) -> Result<Json<IngestReport>> {
    let Json(event) = payload.map_err(|e| {
        tracing::warn!(status = %e.status(), "Rejected storage event: {}", e.body_text());
        AppError::BadRequest(e.body_text())
    })?;

    let report = state.ingestor().ingest(&event).await.map_err(|e| {
        tracing::warn!(kind = e.kind(), "Object ingest failed: {}", e);
        e
    })?;

    Ok(Json(report))
}
