use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::DocumentId;

pub const SERVICE_ACTIVE: &str = "active";
pub const SERVICE_INACTIVE: &str = "inactive";

/// Treatment offered by the clinic, with its list price.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClinicService {
    #[serde(rename = "$id")]
    pub id: DocumentId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
    #[serde(rename = "$createdAt")]
    pub created_at: NaiveDateTime,
    #[serde(rename = "$updatedAt")]
    pub updated_at: NaiveDateTime,
    #[serde(rename = "$version")]
    pub version: i32,
}
