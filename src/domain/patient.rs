use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{BranchName, ClinicalNote, DocumentId, Email, PersonName, PhoneNumber};

/// Prefix of generated patient codes (`BN0001`).
pub const PATIENT_CODE_PREFIX: &str = "BN";

pub const TREATMENT_STATUS_NEW: &str = "new";
pub const TREATMENT_STATUS_IN_PROGRESS: &str = "in_progress";
pub const TREATMENT_STATUS_COMPLETED: &str = "completed";

fn default_treatment_status() -> String {
    TREATMENT_STATUS_NEW.to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    #[serde(rename = "$id")]
    pub id: DocumentId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default = "default_treatment_status")]
    pub treatment_status: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(rename = "isDeleted", default)]
    pub is_deleted: bool,
    #[serde(rename = "$createdAt")]
    pub created_at: NaiveDateTime,
    #[serde(rename = "$updatedAt")]
    pub updated_at: NaiveDateTime,
    #[serde(rename = "$version")]
    pub version: i32,
}

/// Payload persisted when registering a patient.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewPatient {
    pub code: String,
    pub name: PersonName,
    pub phone: Option<PhoneNumber>,
    pub email: Option<Email>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub branch: Option<BranchName>,
    pub treatment_status: String,
    pub notes: Option<ClinicalNote>,
    #[serde(rename = "isDeleted")]
    pub is_deleted: bool,
}

impl NewPatient {
    /// Builds a patient record; the code is assigned by the service on creation.
    #[must_use]
    pub fn new(name: PersonName) -> Self {
        Self {
            code: String::new(),
            name,
            phone: None,
            email: None,
            gender: None,
            birth_date: None,
            address: None,
            branch: None,
            treatment_status: default_treatment_status(),
            notes: None,
            is_deleted: false,
        }
    }
}

/// Partial update applied to a patient; `None` fields are left untouched.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct UpdatePatient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<PersonName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<PhoneNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<ClinicalNote>,
    #[serde(rename = "isDeleted", skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
}

/// Formats the patient code for the given sequence number.
pub fn format_patient_code(sequence: u64) -> String {
    format!("{PATIENT_CODE_PREFIX}{sequence:04}")
}

/// Extracts the numeric suffix of a code such as `BN0045`.
pub fn code_sequence(code: &str) -> Option<u64> {
    let digits_start = code
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(idx, _)| idx)?;
    code[digits_start..].parse().ok()
}
