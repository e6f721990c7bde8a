//! Image classification endpoint.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::AppContext;

#[derive(Serialize)]
pub struct PredictResponse {
    pub disease: &'static str,
    pub description: &'static [&'static str],
    pub medication: &'static str,
    pub diet: &'static str,
}

/// `POST /api/predict` — multipart upload with an `image` field; returns
/// the predicted disease plus its knowledge-base metadata.
///
/// A missing or undecodable image is the client's fault (400); a missing
/// or broken model is ours (500, generic message).
pub async fn classify(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    let mut image_bytes: Option<Vec<u8>> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read image field: {e}")))?;
            image_bytes = Some(bytes.to_vec());
        }
    }

    let image_bytes =
        image_bytes.ok_or_else(|| ApiError::BadRequest("No image file provided".to_string()))?;

    let label = ctx.classifier.predict(&image_bytes).map_err(|e| {
        if e.is_client_error() {
            ApiError::BadRequest("Could not decode the uploaded image".to_string())
        } else {
            ApiError::internal("Prediction failed", e.to_string())
        }
    })?;

    let info = label.info();
    tracing::info!(label = %label, "image classified");

    Ok(Json(PredictResponse {
        disease: info.name,
        description: info.description,
        medication: info.medication,
        diet: info.diet,
    }))
}
