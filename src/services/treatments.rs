use crate::domain::treatment::{PrescriptionLine, Treatment, encode_prescription_line};
use crate::domain::types::DocumentId;
use crate::models::config::CollectionIds;
use crate::repository::{DocumentReader, DocumentWriter};
use crate::services::documents::{get_record, update_record};
use crate::services::entity::Entity;
use crate::services::listing::{ListRequest, ListResult, list_documents};
use crate::services::{ServiceError, ServiceResult};

impl Entity for Treatment {
    const NAME: &'static str = "treatment";
    const SEARCH_FIELDS: &'static [&'static str] = &["patient_name", "service_name", "dentist"];
    const STATUS_FIELD: &'static str = "status";

    fn collection(ids: &CollectionIds) -> &str {
        &ids.treatments
    }
}

pub fn list_treatments<R>(
    repo: &R,
    collections: &CollectionIds,
    request: &ListRequest,
) -> ListResult<Treatment>
where
    R: DocumentReader + Sync + ?Sized,
{
    list_documents::<Treatment, R>(repo, collections, request)
}

/// Replaces the prescription of a treatment.
pub fn set_prescription<R>(
    repo: &R,
    collections: &CollectionIds,
    id: &DocumentId,
    lines: &[PrescriptionLine],
) -> ServiceResult<Treatment>
where
    R: DocumentReader + DocumentWriter + ?Sized,
{
    let treatment = get_record::<Treatment, _>(repo, collections, id)?
        .ok_or(ServiceError::NotFound(Treatment::NAME))?;

    let prescriptions = lines
        .iter()
        .filter(|line| !line.medicine.trim().is_empty())
        .map(encode_prescription_line)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| ServiceError::Internal(format!("Failed to encode prescription: {err}")))?;

    update_record::<Treatment, _, _>(
        repo,
        collections,
        id,
        &serde_json::json!({ "prescriptions": prescriptions }),
        Some(treatment.version),
    )
}
