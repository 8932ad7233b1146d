use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::DocumentId;

pub const TREATMENT_PLANNED: &str = "planned";
pub const TREATMENT_IN_PROGRESS: &str = "in_progress";
pub const TREATMENT_COMPLETED: &str = "completed";
pub const TREATMENT_CANCELLED: &str = "cancelled";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Treatment {
    #[serde(rename = "$id")]
    pub id: DocumentId,
    pub patient_id: String,
    pub patient_name: String,
    pub service_name: String,
    #[serde(default)]
    pub dentist: Option<String>,
    #[serde(default)]
    pub tooth: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    pub status: String,
    #[serde(default)]
    pub cost: f64,
    /// JSON-encoded [`PrescriptionLine`] items.
    #[serde(default)]
    pub prescriptions: Vec<String>,
    #[serde(rename = "$createdAt")]
    pub created_at: NaiveDateTime,
    #[serde(rename = "$updatedAt")]
    pub updated_at: NaiveDateTime,
    #[serde(rename = "$version")]
    pub version: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PrescriptionLine {
    pub medicine: String,
    #[serde(default)]
    pub dosage: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub instructions: Option<String>,
}

impl Treatment {
    pub fn prescription_lines(&self) -> Vec<PrescriptionLine> {
        parse_prescription_lines(&self.prescriptions)
    }
}

/// Decodes stored prescription lines; malformed lines are logged and skipped.
pub fn parse_prescription_lines(lines: &[String]) -> Vec<PrescriptionLine> {
    lines
        .iter()
        .enumerate()
        .filter_map(
            |(idx, raw)| match serde_json::from_str::<PrescriptionLine>(raw) {
                Ok(line) if !line.medicine.trim().is_empty() => Some(line),
                Ok(_) => {
                    log::warn!("Skipping prescription line #{idx} without medicine");
                    None
                }
                Err(err) => {
                    log::warn!("Skipping malformed prescription line #{idx}: {err}");
                    None
                }
            },
        )
        .collect()
}

pub fn encode_prescription_line(line: &PrescriptionLine) -> Result<String, serde_json::Error> {
    serde_json::to_string(line)
}
