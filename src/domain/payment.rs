//! Payment records and their instalment history.
//!
//! The backend stores the history as an array of JSON-encoded strings, one
//! per instalment. [`parse_payment_history`] is the only place that decodes
//! it and [`encode_payment_entry`] the only place that encodes it.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{Amount, DocumentId};

pub const PAYMENT_STATUS_PENDING: &str = "pending";
pub const PAYMENT_STATUS_PARTIAL: &str = "partial";
pub const PAYMENT_STATUS_PAID: &str = "paid";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PaymentRecord {
    #[serde(rename = "$id")]
    pub id: DocumentId,
    #[serde(default)]
    pub invoice_code: Option<String>,
    pub patient_id: String,
    pub patient_name: String,
    #[serde(default)]
    pub patient_code: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    pub amount_due: f64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub history: Vec<String>,
    #[serde(rename = "$createdAt")]
    pub created_at: NaiveDateTime,
    #[serde(rename = "$updatedAt")]
    pub updated_at: NaiveDateTime,
    #[serde(rename = "$version")]
    pub version: i32,
}

/// One instalment of a payment.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PaymentEntry {
    pub amount: Amount,
    pub method: String,
    pub paid_at: NaiveDateTime,
    #[serde(default)]
    pub note: Option<String>,
}

/// Payload persisted when opening a new invoice.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewPaymentRecord {
    pub invoice_code: Option<String>,
    pub patient_id: String,
    pub patient_name: String,
    pub patient_code: Option<String>,
    pub branch: Option<String>,
    pub amount_due: Amount,
    pub status: String,
    pub history: Vec<String>,
}

impl PaymentRecord {
    /// Decoded instalments, skipping malformed entries.
    pub fn entries(&self) -> Vec<PaymentEntry> {
        parse_payment_history(&self.history)
    }

    /// Sum of all recorded instalments.
    pub fn amount_paid(&self) -> f64 {
        self.entries().iter().map(|e| e.amount.get()).sum()
    }

    pub fn amount_remaining(&self) -> f64 {
        (self.amount_due - self.amount_paid()).max(0.0)
    }
}

/// Decodes the stored history. Never fails: malformed items are logged and skipped.
pub fn parse_payment_history(history: &[String]) -> Vec<PaymentEntry> {
    history
        .iter()
        .enumerate()
        .filter_map(
            |(idx, raw)| match serde_json::from_str::<PaymentEntry>(raw) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log::warn!("Skipping malformed payment history entry #{idx}: {err}");
                    None
                }
            },
        )
        .collect()
}

pub fn encode_payment_entry(entry: &PaymentEntry) -> Result<String, serde_json::Error> {
    serde_json::to_string(entry)
}

/// Status implied by the amount due and the amount paid so far.
pub fn payment_status(amount_due: f64, amount_paid: f64) -> &'static str {
    if amount_paid <= 0.0 {
        PAYMENT_STATUS_PENDING
    } else if amount_paid + f64::EPSILON < amount_due {
        PAYMENT_STATUS_PARTIAL
    } else {
        PAYMENT_STATUS_PAID
    }
}
