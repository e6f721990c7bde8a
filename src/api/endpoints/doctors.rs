//! Nearby-doctors endpoint, proxying the locality lookup.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::AppContext;
use crate::geo::LocalityInfo;

#[derive(Deserialize)]
pub struct FindDoctorsQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

/// `GET /find_doctors?lat=..&lon=..` — area name plus up to ten nearby
/// medical facilities. All-or-nothing: any upstream failure is a 500.
pub async fn find(
    State(ctx): State<AppContext>,
    Query(query): Query<FindDoctorsQuery>,
) -> Result<Json<LocalityInfo>, ApiError> {
    let lat = query.lat.filter(|v| !v.is_empty());
    let lon = query.lon.filter(|v| !v.is_empty());
    let (Some(lat), Some(lon)) = (lat, lon) else {
        return Err(ApiError::BadRequest(
            "Latitude and longitude are required".to_string(),
        ));
    };

    let info = ctx
        .geo
        .resolve(&lat, &lon)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    Ok(Json(info))
}
