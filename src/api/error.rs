//! API error types with structured JSON responses.
//!
//! Every per-request failure converts to one of four variants at the
//! request boundary. Upstream and internal details are logged, never
//! surfaced to the client; the reference error texts are preserved.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    /// Provider failure; the string is the logged detail, the client sees
    /// a fixed generic message.
    #[error("Upstream failure: {0}")]
    Upstream(String),
    /// Unexpected failure; `public` is the client-facing message, `detail`
    /// is logged only.
    #[error("Internal error: {detail}")]
    Internal {
        public: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn internal(public: &'static str, detail: impl Into<String>) -> Self {
        ApiError::Internal {
            public,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::Upstream(detail) => {
                tracing::error!(detail, "upstream provider failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM_FAILURE",
                    "Failed to fetch data from OpenStreetMap APIs".to_string(),
                )
            }
            ApiError::Internal { public, detail } => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    public.to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<crate::db::DatabaseError> for ApiError {
    fn from(err: crate::db::DatabaseError) -> Self {
        ApiError::internal("An internal error occurred", err.to_string())
    }
}
