//! Text extraction routes
//!
//! `POST /extract` takes a base64-encoded document and returns its text,
//! served from the content-addressed cache when possible.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};

use crate::cache::{ExtractRequest, ExtractionResponse};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the extract router
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(extract_text))
}

/// Extract text from a document
async fn extract_text(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractionResponse>> {
    let Json(request) = payload.map_err(|e| {
        tracing::warn!(status = %e.status(), "Rejected extract request: {}", e.body_text());
        AppError::BadRequest(e.body_text())
    })?;

    let response = state
        .cache()
        .handle(&request.filename, &request.file_content)
        .await
        .map_err(|e| {
            tracing::warn!(
                filename = %request.filename,
                kind = e.kind(),
                "Extraction request failed: {}",
                e
            );
            e
        })?;

    Ok(Json(response))
}
