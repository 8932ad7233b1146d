use crate::domain::patient::{NewPatient, Patient, UpdatePatient, code_sequence, format_patient_code};
use crate::domain::types::DocumentId;
use crate::models::config::CollectionIds;
use crate::repository::{DocumentReader, DocumentWriter, Predicate};
use crate::services::documents::{create_record, update_record};
use crate::services::entity::Entity;
use crate::services::listing::{ListRequest, ListResult, highest_code, list_documents};
use crate::services::{ServiceError, ServiceResult};

impl Entity for Patient {
    const NAME: &'static str = "patient";
    const SEARCH_FIELDS: &'static [&'static str] = &["code", "name", "phone", "email"];
    const STATUS_FIELD: &'static str = "treatment_status";

    fn collection(ids: &CollectionIds) -> &str {
        &ids.patients
    }

    /// Soft-deleted patients never appear in listings.
    fn base_predicates() -> Vec<Predicate> {
        vec![Predicate::equal("isDeleted", false)]
    }
}

pub fn list_patients<R>(
    repo: &R,
    collections: &CollectionIds,
    request: &ListRequest,
) -> ListResult<Patient>
where
    R: DocumentReader + Sync + ?Sized,
{
    list_documents::<Patient, R>(repo, collections, request)
}

/// Code following the highest code issued so far, deleted patients included.
pub fn next_patient_code<R>(repo: &R, collections: &CollectionIds) -> ServiceResult<String>
where
    R: DocumentReader + ?Sized,
{
    let highest = highest_code(repo, Patient::collection(collections), Vec::new(), "code")
        .map_err(ServiceError::from)?;
    let sequence = highest.as_deref().and_then(code_sequence).unwrap_or(0);
    Ok(format_patient_code(sequence + 1))
}

/// Registers a patient under the next free code.
pub fn create_patient<R>(
    repo: &R,
    collections: &CollectionIds,
    mut patient: NewPatient,
) -> ServiceResult<Patient>
where
    R: DocumentReader + DocumentWriter + ?Sized,
{
    patient.code = next_patient_code(repo, collections)?;
    create_record::<Patient, _, _>(repo, collections, &patient)
}

pub fn update_patient<R>(
    repo: &R,
    collections: &CollectionIds,
    id: &DocumentId,
    updates: &UpdatePatient,
    expected_version: Option<i32>,
) -> ServiceResult<Patient>
where
    R: DocumentWriter + ?Sized,
{
    update_record::<Patient, _, _>(repo, collections, id, updates, expected_version)
}

/// Hides the patient from listings while keeping the record and its code.
pub fn soft_delete_patient<R>(
    repo: &R,
    collections: &CollectionIds,
    id: &DocumentId,
) -> ServiceResult<Patient>
where
    R: DocumentWriter + ?Sized,
{
    let updates = UpdatePatient {
        is_deleted: Some(true),
        ..UpdatePatient::default()
    };
    update_record::<Patient, _, _>(repo, collections, id, &updates, None)
}
