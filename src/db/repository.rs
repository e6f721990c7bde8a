//! Prescription record persistence over a flattened `predictions` table.
//!
//! `age` and `description` columns hold their JSON encodings so a record
//! round-trips exactly as submitted (a numeric age stays a number).

use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::{PatientRecord, PrescriptionRecord};

pub fn insert_prescription(
    conn: &Connection,
    record: &PrescriptionRecord,
) -> Result<(), DatabaseError> {
    let age_json = serde_json::to_string(&record.patient.age)
        .map_err(|e| corrupt(&record.id, &e.to_string()))?;
    let description_json = serde_json::to_string(&record.description)
        .map_err(|e| corrupt(&record.id, &e.to_string()))?;

    conn.execute(
        "INSERT INTO predictions (id, patient_name, patient_age, patient_gender,
         patient_whatsapp, prediction, description, medication, diet, pdf_base64, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            record.id,
            record.patient.name,
            age_json,
            record.patient.gender,
            record.patient.whatsapp,
            record.prediction,
            description_json,
            record.medication,
            record.diet,
            record.pdf_base64,
            record.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_prescription(
    conn: &Connection,
    id: &str,
) -> Result<Option<PrescriptionRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_name, patient_age, patient_gender, patient_whatsapp,
         prediction, description, medication, diet, pdf_base64, created_at
         FROM predictions WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id], |row| {
        Ok(PrescriptionRow {
            id: row.get::<_, String>(0)?,
            patient_name: row.get::<_, String>(1)?,
            patient_age: row.get::<_, String>(2)?,
            patient_gender: row.get::<_, String>(3)?,
            patient_whatsapp: row.get::<_, Option<String>>(4)?,
            prediction: row.get::<_, String>(5)?,
            description: row.get::<_, String>(6)?,
            medication: row.get::<_, String>(7)?,
            diet: row.get::<_, String>(8)?,
            pdf_base64: row.get::<_, String>(9)?,
            created_at: row.get::<_, String>(10)?,
        })
    });

    match result {
        Ok(row) => Ok(Some(prescription_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// Internal row type for PrescriptionRecord mapping
struct PrescriptionRow {
    id: String,
    patient_name: String,
    patient_age: String,
    patient_gender: String,
    patient_whatsapp: Option<String>,
    prediction: String,
    description: String,
    medication: String,
    diet: String,
    pdf_base64: String,
    created_at: String,
}

fn prescription_from_row(row: PrescriptionRow) -> Result<PrescriptionRecord, DatabaseError> {
    let age = serde_json::from_str(&row.patient_age)
        .map_err(|e| corrupt(&row.id, &format!("age column: {e}")))?;
    let description = serde_json::from_str(&row.description)
        .map_err(|e| corrupt(&row.id, &format!("description column: {e}")))?;

    Ok(PrescriptionRecord {
        id: row.id,
        patient: PatientRecord {
            name: row.patient_name,
            age,
            gender: row.patient_gender,
            whatsapp: row.patient_whatsapp,
        },
        prediction: row.prediction,
        description,
        medication: row.medication,
        diet: row.diet,
        pdf_base64: row.pdf_base64,
        created_at: row.created_at,
    })
}

fn corrupt(id: &str, reason: &str) -> DatabaseError {
    DatabaseError::CorruptRecord {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}
