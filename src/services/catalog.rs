use crate::domain::catalog::ClinicService;
use crate::models::config::CollectionIds;
use crate::repository::DocumentReader;
use crate::services::entity::{Entity, FETCH_ALL_LIMIT};
use crate::services::listing::{ListRequest, ListResult, list_documents};

impl Entity for ClinicService {
    const NAME: &'static str = "clinic service";
    const SEARCH_FIELDS: &'static [&'static str] = &["code", "name"];
    const STATUS_FIELD: &'static str = "status";
    const BRANCH_SCOPED: bool = false;

    fn collection(ids: &CollectionIds) -> &str {
        &ids.services
    }
}

pub fn list_services<R>(
    repo: &R,
    collections: &CollectionIds,
    request: &ListRequest,
) -> ListResult<ClinicService>
where
    R: DocumentReader + Sync + ?Sized,
{
    list_documents::<ClinicService, R>(repo, collections, request)
}

/// Every service in the catalog, for pickers.
pub fn all_services<R>(repo: &R, collections: &CollectionIds) -> Vec<ClinicService>
where
    R: DocumentReader + Sync + ?Sized,
{
    list_services(repo, collections, &ListRequest::new().limit(FETCH_ALL_LIMIT)).data
}
