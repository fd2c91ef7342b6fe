//! API error types and responses
//!
//! Every capability refusal collapses into a single `401` so a remote caller
//! cannot tell a forged token from an expired one or from one bound to a
//! different file. Internal faults are logged with detail and answered with
//! a generic body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::core::{IssueError, ValidationError};
use crate::documents::DocumentError;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    /// The document cannot be offered (missing or empty) at issuance time
    #[error("Document not found or empty")]
    DocumentNotFound,

    /// Missing, invalid, expired or mismatched capability
    #[error("Invalid or expired access token")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::DocumentNotFound => (
                StatusCode::NOT_FOUND,
                "DOCUMENT_NOT_FOUND",
                "Document not found or empty. Add a non-empty document at the configured path."
                    .to_string(),
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid or expired access token".to_string(),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::Internal(detail) => {
                error!(detail = %detail, "Internal failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<IssueError> for ApiError {
    fn from(err: IssueError) -> Self {
        match err {
            IssueError::Document(e) if e.is_not_found() => ApiError::DocumentNotFound,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Rejected(_) => ApiError::Unauthorized,
            ValidationError::Storage(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        if err.is_not_found() {
            ApiError::NotFound("File not found or empty".into())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}
