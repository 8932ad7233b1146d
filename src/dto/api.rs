use serde::Deserialize;

use crate::services::listing::ListRequest;

/// Query parameters of the JSON list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ApiListQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub search: Option<String>,
    pub status: Option<String>,
    /// Inventory only.
    pub category: Option<String>,
}

impl From<&ApiListQuery> for ListRequest {
    fn from(query: &ApiListQuery) -> Self {
        ListRequest {
            limit: query.limit,
            offset: query.offset,
            search: query.search.clone(),
            status: query.status.clone(),
            ..ListRequest::default()
        }
    }
}
