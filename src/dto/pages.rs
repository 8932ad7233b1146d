use serde::Serialize;

use crate::domain::payment::{PaymentEntry, PaymentRecord};
use crate::table::TableView;
use crate::table::state::ListViewState;

/// Data required to render `list.html`.
#[derive(Debug, Serialize)]
pub struct ListPageData {
    pub title: &'static str,
    /// Path of the page, used by links that change the list state.
    pub path: &'static str,
    pub table: TableView,
    pub state: ListViewState,
    pub create_url: Option<&'static str>,
}

/// A payment with its decoded history.
#[derive(Debug, Serialize)]
pub struct PaymentDetail {
    pub record: PaymentRecord,
    pub entries: Vec<PaymentEntry>,
    pub amount_paid: f64,
    pub amount_remaining: f64,
}

impl From<PaymentRecord> for PaymentDetail {
    fn from(record: PaymentRecord) -> Self {
        Self {
            entries: record.entries(),
            amount_paid: record.amount_paid(),
            amount_remaining: record.amount_remaining(),
            record,
        }
    }
}
