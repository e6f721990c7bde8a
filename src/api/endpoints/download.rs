//! Stored-report download endpoint.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use base64::Engine;

use crate::api::error::ApiError;
use crate::api::types::AppContext;
use crate::db;

/// `GET /download/:doc_id` — decode the stored report and send it as a
/// file attachment.
pub async fn fetch(
    State(ctx): State<AppContext>,
    Path(doc_id): Path<String>,
) -> Result<Response, ApiError> {
    let record = {
        let conn = ctx
            .db
            .lock()
            .map_err(|_| ApiError::internal("Failed to retrieve PDF", "db lock poisoned"))?;
        db::get_prescription(&conn, &doc_id)?
    };

    let record = record.ok_or_else(|| ApiError::NotFound("Document not found".to_string()))?;

    if record.pdf_base64.is_empty() {
        return Err(ApiError::NotFound(
            "No PDF found for this document".to_string(),
        ));
    }

    let pdf_bytes = base64::engine::general_purpose::STANDARD
        .decode(&record.pdf_base64)
        .map_err(|e| ApiError::internal("Failed to retrieve PDF", e.to_string()))?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{doc_id}.pdf\""),
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}
