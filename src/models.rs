//! Request-level and persisted data shapes.

use serde::{Deserialize, Serialize};

/// Age as submitted by the client. The field arrives as either a JSON number
/// or a string; both forms are accepted and preserved through storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgeValue {
    Number(serde_json::Number),
    Text(String),
}

impl std::fmt::Display for AgeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgeValue::Number(n) => write!(f, "{n}"),
            AgeValue::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub name: String,
    pub age: AgeValue,
    pub gender: String,
    /// Delivery handle. Absent or empty means no notification is sent.
    pub whatsapp: Option<String>,
}

impl PatientRecord {
    /// Contact handle usable for delivery, if any.
    pub fn contact_handle(&self) -> Option<&str> {
        self.whatsapp.as_deref().filter(|h| !h.is_empty())
    }
}

/// Diagnosis as rendered into a report. `disease` carries the display name
/// produced by the knowledge base, not the raw classifier label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub disease: String,
    pub description: Vec<String>,
    pub medication: String,
    pub diet: String,
}

/// Persisted report record, keyed by a caller-generated UUID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionRecord {
    pub id: String,
    pub patient: PatientRecord,
    pub prediction: String,
    pub description: Vec<String>,
    pub medication: String,
    pub diet: String,
    #[serde(rename = "pdfBase64")]
    pub pdf_base64: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}
