use serde::Serialize;

use crate::domain::payment::{
    NewPaymentRecord, PAYMENT_STATUS_PENDING, PaymentEntry, PaymentRecord, encode_payment_entry,
    payment_status,
};
use crate::domain::types::DocumentId;
use crate::models::config::CollectionIds;
use crate::repository::{DocumentReader, DocumentWriter, OrderBy};
use crate::services::documents::{create_record, get_record, update_record};
use crate::services::entity::Entity;
use crate::services::listing::{ListRequest, ListResult, list_documents};
use crate::services::{ServiceError, ServiceResult};

impl Entity for PaymentRecord {
    const NAME: &'static str = "payment";
    const SEARCH_FIELDS: &'static [&'static str] = &["invoice_code", "patient_name", "patient_code"];
    const STATUS_FIELD: &'static str = "status";
    const ORDER: OrderBy = OrderBy::CreatedAtDesc;

    fn collection(ids: &CollectionIds) -> &str {
        &ids.payments
    }
}

pub fn list_payments<R>(
    repo: &R,
    collections: &CollectionIds,
    request: &ListRequest,
) -> ListResult<PaymentRecord>
where
    R: DocumentReader + Sync + ?Sized,
{
    list_documents::<PaymentRecord, R>(repo, collections, request)
}

pub fn create_payment<R>(
    repo: &R,
    collections: &CollectionIds,
    mut record: NewPaymentRecord,
) -> ServiceResult<PaymentRecord>
where
    R: DocumentWriter + ?Sized,
{
    record.status = PAYMENT_STATUS_PENDING.to_string();
    record.history.clear();
    create_record::<PaymentRecord, _, _>(repo, collections, &record)
}

#[derive(Serialize)]
struct PaymentProgress<'a> {
    history: &'a [String],
    status: &'a str,
}

/// Appends an instalment and recomputes the payment status.
///
/// The write is guarded by the version read here, so two cashiers recording
/// against the same invoice cannot overwrite each other's entries.
pub fn record_payment<R>(
    repo: &R,
    collections: &CollectionIds,
    id: &DocumentId,
    entry: &PaymentEntry,
) -> ServiceResult<PaymentRecord>
where
    R: DocumentReader + DocumentWriter + ?Sized,
{
    let record = get_record::<PaymentRecord, _>(repo, collections, id)?
        .ok_or(ServiceError::NotFound(PaymentRecord::NAME))?;

    let encoded = encode_payment_entry(entry)
        .map_err(|err| ServiceError::Internal(format!("Failed to encode payment entry: {err}")))?;
    let mut history = record.history.clone();
    history.push(encoded);

    let paid = record.amount_paid() + entry.amount.get();
    let progress = PaymentProgress {
        history: &history,
        status: payment_status(record.amount_due, paid),
    };

    update_record::<PaymentRecord, _, _>(repo, collections, id, &progress, Some(record.version))
}
