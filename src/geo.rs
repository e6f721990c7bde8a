//! Locality lookup — reverse geocoding plus nearby medical facilities.
//!
//! Two sequential upstream calls: Nominatim resolves the coordinate to an
//! area name, then an Overpass QL query lists doctors, clinics, and
//! hospitals within a fixed radius. The lookup is all-or-nothing: a
//! failure on either call aborts the whole resolution, partial results are
//! never returned.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{NOMINATIM_URL, OVERPASS_URL, USER_AGENT};

/// Search radius for medical facilities, meters.
const RADIUS_METERS: u32 = 5000;

/// Facilities returned per lookup, at most.
const MAX_RESULTS: usize = 10;

/// Placeholder when reverse geocoding yields nothing usable.
const FALLBACK_AREA: &str = "Your current area";

/// Placeholders for unnamed or unaddressed facilities.
const FALLBACK_NAME: &str = "Medical Facility";
const FALLBACK_ADDRESS: &str = "Address not available";

/// Opaque lookup failure; the detail is for logs, never for clients.
#[derive(Debug, Error)]
#[error("locality lookup failed: {0}")]
pub struct LookupError(pub String);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Doctor {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalityInfo {
    pub area_name: String,
    pub doctors: Vec<Doctor>,
}

#[derive(Deserialize)]
struct ReverseGeocodeResponse {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Deserialize)]
struct OverpassElement {
    #[serde(default)]
    tags: HashMap<String, String>,
}

/// Client over the two OpenStreetMap providers.
#[derive(Clone)]
pub struct GeoClient {
    client: reqwest::Client,
    nominatim_url: String,
    overpass_url: String,
}

impl GeoClient {
    pub fn new() -> Self {
        Self::with_endpoints(NOMINATIM_URL, OVERPASS_URL)
    }

    /// Client against explicit provider roots. Test seam.
    pub fn with_endpoints(nominatim_url: &str, overpass_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            nominatim_url: nominatim_url.trim_end_matches('/').to_string(),
            overpass_url: overpass_url.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve a coordinate to an area name and nearby medical facilities.
    ///
    /// Coordinates pass through as opaque strings; the upstream providers
    /// validate them.
    pub async fn resolve(&self, lat: &str, lon: &str) -> Result<LocalityInfo, LookupError> {
        let area_name = self.reverse_geocode(lat, lon).await?;
        let doctors = self.nearby_facilities(lat, lon).await?;
        Ok(LocalityInfo { area_name, doctors })
    }

    async fn reverse_geocode(&self, lat: &str, lon: &str) -> Result<String, LookupError> {
        let url = format!("{}/reverse", self.nominatim_url);
        let response = self
            .client
            .get(&url)
            .query(&[("format", "jsonv2"), ("lat", lat), ("lon", lon)])
            .send()
            .await
            .map_err(|e| LookupError(format!("nominatim request: {e}")))?
            .error_for_status()
            .map_err(|e| LookupError(format!("nominatim status: {e}")))?;

        let parsed: ReverseGeocodeResponse = response
            .json()
            .await
            .map_err(|e| LookupError(format!("nominatim body: {e}")))?;

        Ok(parsed
            .display_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| FALLBACK_AREA.to_string()))
    }

    async fn nearby_facilities(&self, lat: &str, lon: &str) -> Result<Vec<Doctor>, LookupError> {
        let query = format!(
            "[out:json];\n(\n  \
             node[\"amenity\"~\"doctors|clinic|hospital\"](around:{RADIUS_METERS},{lat},{lon});\n  \
             way[\"amenity\"~\"doctors|clinic|hospital\"](around:{RADIUS_METERS},{lat},{lon});\n  \
             relation[\"amenity\"~\"doctors|clinic|hospital\"](around:{RADIUS_METERS},{lat},{lon});\n\
             );\nout center;"
        );

        let response = self
            .client
            .post(&self.overpass_url)
            .body(query)
            .send()
            .await
            .map_err(|e| LookupError(format!("overpass request: {e}")))?
            .error_for_status()
            .map_err(|e| LookupError(format!("overpass status: {e}")))?;

        let parsed: OverpassResponse = response
            .json()
            .await
            .map_err(|e| LookupError(format!("overpass body: {e}")))?;

        Ok(parsed
            .elements
            .into_iter()
            .take(MAX_RESULTS)
            .map(|element| doctor_from_tags(&element.tags))
            .collect())
    }
}

impl Default for GeoClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize one POI element: street+housenumber, else the full-address
/// tag, else a placeholder; unnamed facilities get a generic name.
fn doctor_from_tags(tags: &HashMap<String, String>) -> Doctor {
    let name = tags
        .get("name")
        .filter(|n| !n.is_empty())
        .cloned()
        .unwrap_or_else(|| FALLBACK_NAME.to_string());

    let street = tags.get("addr:street").map(String::as_str).unwrap_or("");
    let house = tags
        .get("addr:housenumber")
        .map(String::as_str)
        .unwrap_or("");
    let mut address = format!("{street} {house}").trim().to_string();
    if address.is_empty() {
        address = tags
            .get("addr:full")
            .filter(|a| !a.is_empty())
            .cloned()
            .unwrap_or_else(|| FALLBACK_ADDRESS.to_string());
    }

    Doctor { name, address }
}
