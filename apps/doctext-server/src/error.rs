//! Error types for the Doctext server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
///
/// Cloneable so that one outcome can be handed to every request that joined
/// the same in-flight cache population.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("S3 error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Storage-specific errors
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Stored object {0} is not valid UTF-8")]
    InvalidUtf8(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("S3 SDK error: {0}")]
    SdkError(String),
}

/// Text extraction errors
#[derive(Error, Debug, Clone)]
pub enum ExtractionError {
    #[error("Unsupported document format")]
    UnsupportedFormat,

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("Extraction task failed: {0}")]
    TaskFailed(String),
}

impl From<mupdf::Error> for ExtractionError {
    fn from(err: mupdf::Error) -> Self {
        ExtractionError::Malformed(err.to_string())
    }
}

impl AppError {
    /// Short machine-readable kind, used in error bodies and logs
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "input_error",
            AppError::NotFound(_) => "not_found",
            AppError::Extraction(_) => "extraction_error",
            AppError::Storage(StorageError::AccessDenied(_)) => "access_denied",
            AppError::Storage(_) => "storage_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::BadRequest(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::Extraction(e) => e.to_string(),
            AppError::Storage(e) => {
                tracing::error!("Storage error: {}", e);
                "Storage error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
        };

        let body = Json(ErrorResponse {
            error: self.kind().to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}
