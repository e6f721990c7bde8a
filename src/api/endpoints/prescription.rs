//! Save-prescription endpoint: render the report, persist it, write the
//! local copy, and deliver the link best-effort.

use axum::extract::State;
use axum::Json;
use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::AppContext;
use crate::db;
use crate::models::{AgeValue, Diagnosis, PatientRecord, PrescriptionRecord};
use crate::report;

/// All fields optional at the serde level so a missing one maps to a 400
/// instead of a deserialization failure.
#[derive(Deserialize)]
pub struct SavePrescriptionRequest {
    pub name: Option<String>,
    pub age: Option<AgeValue>,
    pub gender: Option<String>,
    pub whatsapp: Option<String>,
    pub disease: Option<String>,
    pub description: Option<Vec<String>>,
    pub medication: Option<String>,
    pub diet: Option<String>,
}

#[derive(Serialize)]
pub struct SavePrescriptionResponse {
    pub message: &'static str,
    pub id: String,
    pub pdf_url: String,
}

fn require<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::BadRequest(format!("Missing field: {field}")))
}

/// `POST /api/save-prescription`.
///
/// The save succeeds once the record is persisted; notification delivery
/// is best-effort and never fails the request.
pub async fn save(
    State(ctx): State<AppContext>,
    Json(request): Json<SavePrescriptionRequest>,
) -> Result<Json<SavePrescriptionResponse>, ApiError> {
    let patient = PatientRecord {
        name: require(request.name, "name")?,
        age: require(request.age, "age")?,
        gender: require(request.gender, "gender")?,
        whatsapp: request.whatsapp,
    };
    let diagnosis = Diagnosis {
        disease: require(request.disease, "disease")?,
        description: require(request.description, "description")?,
        medication: require(request.medication, "medication")?,
        diet: require(request.diet, "diet")?,
    };

    let pdf_bytes = report::render(&patient, &diagnosis)
        .map_err(|e| ApiError::internal("Failed to save prescription", e.to_string()))?;
    let pdf_base64 = base64::engine::general_purpose::STANDARD.encode(&pdf_bytes);

    let id = Uuid::new_v4().to_string();
    let record = PrescriptionRecord {
        id: id.clone(),
        patient: patient.clone(),
        prediction: diagnosis.disease.clone(),
        description: diagnosis.description.clone(),
        medication: diagnosis.medication.clone(),
        diet: diagnosis.diet.clone(),
        pdf_base64,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    {
        let conn = ctx
            .db
            .lock()
            .map_err(|_| ApiError::internal("Failed to save prescription", "db lock poisoned"))?;
        db::insert_prescription(&conn, &record)
            .map_err(|e| ApiError::internal("Failed to save prescription", e.to_string()))?;
    }

    // Local copy under reports/<id>.pdf, served directly and used as the
    // outbound media attachment.
    let filename = format!("{id}.pdf");
    std::fs::create_dir_all(&ctx.config.reports_dir)
        .and_then(|_| std::fs::write(ctx.config.reports_dir.join(&filename), &pdf_bytes))
        .map_err(|e| ApiError::internal("Failed to save prescription", e.to_string()))?;

    let pdf_url = ctx.config.report_url(&filename);
    tracing::info!(id, "prescription saved");

    notify_best_effort(&ctx, &patient, &pdf_url).await;

    Ok(Json(SavePrescriptionResponse {
        message: "Prescription saved",
        id,
        pdf_url,
    }))
}

/// Delivery failures are warnings, never request failures.
async fn notify_best_effort(ctx: &AppContext, patient: &PatientRecord, pdf_url: &str) {
    let Some(handle) = patient.contact_handle() else {
        return;
    };

    match &ctx.twilio {
        Some(twilio) => {
            match twilio.send_report_link(handle, &patient.name, pdf_url).await {
                Ok(sid) => tracing::info!(sid, "report link delivered"),
                Err(e) => tracing::warn!(error = %e, "report delivery failed; prescription still saved"),
            }
        }
        None => {
            tracing::warn!("contact handle present but messaging is not configured; skipping delivery");
        }
    }
}
