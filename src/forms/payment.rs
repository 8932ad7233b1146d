use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::payment::PaymentEntry;
use crate::domain::types::{Amount, PaymentMethod};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
/// Form data for recording one instalment against a payment.
pub struct RecordPaymentForm {
    /// Version of the payment the cashier was looking at.
    pub version: i32,
    #[validate(range(exclusive_min = 0.0))]
    pub amount: f64,
    #[validate(length(min = 1, max = 64))]
    pub method: String,
    #[serde(default)]
    #[validate(length(max = 512))]
    pub note: Option<String>,
}

impl RecordPaymentForm {
    /// Validates the form and converts it into a history entry paid at `now`.
    pub fn into_entry(self, now: NaiveDateTime) -> Result<PaymentEntry, FormError> {
        self.validate()?;

        let method = PaymentMethod::new(self.method.trim())?;
        Ok(PaymentEntry {
            amount: Amount::new(self.amount)?,
            method: method.into_inner(),
            paid_at: now,
            note: non_blank(&self.note).map(str::to_string),
        })
    }
}
