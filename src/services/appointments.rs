use crate::domain::appointment::Appointment;
use crate::models::config::CollectionIds;
use crate::repository::DocumentReader;
use crate::services::entity::Entity;
use crate::services::listing::{ListRequest, ListResult, list_documents};

impl Entity for Appointment {
    const NAME: &'static str = "appointment";
    const SEARCH_FIELDS: &'static [&'static str] = &["patient_name", "patient_phone", "dentist"];
    const STATUS_FIELD: &'static str = "status";

    fn collection(ids: &CollectionIds) -> &str {
        &ids.appointments
    }
}

pub fn list_appointments<R>(
    repo: &R,
    collections: &CollectionIds,
    request: &ListRequest,
) -> ListResult<Appointment>
where
    R: DocumentReader + Sync + ?Sized,
{
    list_documents::<Appointment, R>(repo, collections, request)
}
