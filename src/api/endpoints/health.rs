//! Liveness probe.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::AppContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub version: &'static str,
}

/// `GET /api/health` — liveness plus whether the classifier model has
/// been loaded yet (it loads lazily on the first prediction).
pub async fn check(State(ctx): State<AppContext>) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok",
        model_loaded: ctx.classifier.is_loaded(),
        version: crate::config::APP_VERSION,
    }))
}
