use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Json,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use formfill_core::FormError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message describing what went wrong
    pub error: String,
    /// Machine-readable error kind, e.g. `INVALID_MODULE`
    pub code: String,
}

/// Application-specific error types for the API
#[derive(Debug, Error)]
pub enum AppError {
    /// Form, mapping and document errors from formfill-core
    #[error(transparent)]
    Form(#[from] FormError),
    /// Malformed multipart framing or a body over the size limit
    #[error("Failed to read multipart upload: {0}")]
    Multipart(#[from] MultipartError),
    /// Not a multipart request at all (wrong content type, bad boundary)
    #[error("Expected a multipart/form-data upload: {0}")]
    NotMultipart(#[from] MultipartRejection),
    /// Failures on the host side (worker task panics and the like)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Form(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            AppError::Form(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Multipart(e) => e.status(),
            AppError::NotMultipart(e) => e.status(),
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Form(e) => e.code(),
            AppError::Multipart(_) | AppError::NotMultipart(_) => "BAD_MULTIPART",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(code = self.code(), error = %self, "request rejected");
        }

        let error_response = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}
