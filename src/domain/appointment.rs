use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::DocumentId;

pub const APPOINTMENT_SCHEDULED: &str = "scheduled";
pub const APPOINTMENT_CONFIRMED: &str = "confirmed";
pub const APPOINTMENT_COMPLETED: &str = "completed";
pub const APPOINTMENT_CANCELLED: &str = "cancelled";
pub const APPOINTMENT_NO_SHOW: &str = "no_show";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    #[serde(rename = "$id")]
    pub id: DocumentId,
    #[serde(default)]
    pub patient_id: Option<String>,
    pub patient_name: String,
    #[serde(default)]
    pub patient_phone: Option<String>,
    #[serde(default)]
    pub dentist: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    pub scheduled_at: NaiveDateTime,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(rename = "$createdAt")]
    pub created_at: NaiveDateTime,
    #[serde(rename = "$updatedAt")]
    pub updated_at: NaiveDateTime,
    #[serde(rename = "$version")]
    pub version: i32,
}

impl Appointment {
    /// Whether the visit still occupies a chair slot.
    pub fn is_active(&self) -> bool {
        matches!(
            self.status.as_str(),
            APPOINTMENT_SCHEDULED | APPOINTMENT_CONFIRMED
        )
    }
}
