//! Page-owned list state, updated only through [`TableEvent`]s.

use serde::{Deserialize, Serialize};

use crate::services::entity::DEFAULT_LIST_LIMIT;
use crate::services::listing::{ALL_STATUSES, FieldFilter, ListRequest};
use crate::table::{TableEvent, TableProps};
use crate::table::cache::ListKey;

/// Pagination and filter state of one list page.
///
/// Deserializes from the page's query string; missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListViewState {
    /// 1-based.
    pub page: usize,
    pub limit: usize,
    pub status: String,
    /// Search applied to queries.
    pub search: String,
    /// Raw text in the search box, ahead of `search` while typing.
    #[serde(skip)]
    pub search_input: String,
    /// Value of the page's extra filter (category, ...).
    pub filter: Option<String>,
}

impl Default for ListViewState {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIST_LIMIT,
            status: ALL_STATUSES.to_string(),
            search: String::new(),
            search_input: String::new(),
            filter: None,
        }
    }
}

impl ListViewState {
    /// Repairs values that came from an untrusted query string.
    pub fn sanitized(mut self) -> Self {
        self.page = self.page.max(1);
        if self.limit == 0 {
            self.limit = DEFAULT_LIST_LIMIT;
        }
        if self.status.trim().is_empty() {
            self.status = ALL_STATUSES.to_string();
        }
        self.filter = self.filter.filter(|f| !f.trim().is_empty());
        self.search_input = self.search.clone();
        self
    }

    /// Applies a table intent. Anything that changes the result set sends
    /// the page back to 1. Returns whether the query changed; typing into
    /// the search box alone does not count.
    pub fn apply(&mut self, event: TableEvent) -> bool {
        let before = self.key("", None);
        match event {
            TableEvent::PageChanged(page) => self.page = page.max(1),
            TableEvent::LimitChanged(limit) => {
                let limit = limit.max(1);
                if limit != self.limit {
                    self.limit = limit;
                    self.page = 1;
                }
            }
            TableEvent::SearchChanged(search) => {
                self.search_input = search.clone();
                if search != self.search {
                    self.search = search;
                    self.page = 1;
                }
            }
            TableEvent::StatusChanged(status) => {
                if status != self.status {
                    self.status = status;
                    self.page = 1;
                }
            }
            TableEvent::FilterChanged(filter) => {
                if filter != self.filter {
                    self.filter = filter;
                    self.page = 1;
                }
            }
        }
        self.key("", None) != before
    }

    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1) * self.limit
    }

    /// Request for the current state; `filter_field` names the field the
    /// extra filter applies to.
    pub fn to_request(&self, filter_field: Option<&str>) -> ListRequest {
        let mut request = ListRequest::new()
            .limit(self.limit)
            .offset(self.offset())
            .search(self.search.clone())
            .status(self.status.clone());
        if let (Some(field), Some(value)) = (filter_field, &self.filter) {
            request = request.filter(field, value.as_str());
        }
        request
    }

    pub fn table_props(&self, total: usize, is_loading: bool) -> TableProps {
        TableProps {
            page: self.page,
            limit: self.limit,
            total,
            is_loading,
            status: self.status.clone(),
            search: self.search_input.clone(),
            filter: self.filter.clone(),
        }
    }

    /// Cache key of the current state. `scope` carries filters the page adds
    /// on its own, such as the branch of the signed-in user.
    pub fn key(&self, entity: &'static str, scope: Option<FieldFilter>) -> ListKey {
        ListKey {
            entity,
            page: self.page,
            limit: self.limit,
            status: self.status.clone(),
            search: self.search.trim().to_string(),
            filter: self.filter.clone(),
            scope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_change_resets_to_first_page() {
        let mut state = ListViewState {
            page: 3,
            ..ListViewState::default()
        };
        assert_eq!(state.to_request(None).offset, Some(40));

        assert!(state.apply(TableEvent::StatusChanged("completed".into())));
        assert_eq!(state.page, 1);
        let request = state.to_request(None);
        assert_eq!(request.offset, Some(0));
        assert_eq!(request.status.as_deref(), Some("completed"));
    }

    #[test]
    fn search_and_filter_changes_reset_the_page() {
        let mut state = ListViewState {
            page: 4,
            ..ListViewState::default()
        };
        state.apply(TableEvent::SearchChanged("Tran".into()));
        assert_eq!(state.page, 1);

        state.apply(TableEvent::PageChanged(2));
        state.apply(TableEvent::FilterChanged(Some("Consumables".into())));
        assert_eq!(state.page, 1);
        let request = state.to_request(Some("category"));
        assert_eq!(request.filters, vec![FieldFilter::new("category", "Consumables")]);
    }

    #[test]
    fn repeated_values_do_not_reset_the_page() {
        let mut state = ListViewState {
            page: 2,
            search: "Tran".into(),
            ..ListViewState::default()
        };
        assert!(!state.apply(TableEvent::SearchChanged("Tran".into())));
        assert!(!state.apply(TableEvent::StatusChanged("all".into())));
        assert_eq!(state.page, 2);
        assert_eq!(state.search_input, "Tran");
    }

    #[test]
    fn page_and_limit_changes_report_a_new_query() {
        let mut state = ListViewState::default();
        assert!(state.apply(TableEvent::PageChanged(3)));
        assert!(!state.apply(TableEvent::PageChanged(3)));
        assert!(state.apply(TableEvent::LimitChanged(50)));
        assert_eq!(state.page, 1);
    }

    #[test]
    fn query_string_values_are_sanitized() {
        let state: ListViewState = serde_json::from_value(serde_json::json!({
            "page": 0, "limit": 0, "status": "", "filter": ""
        }))
        .unwrap();
        let state = state.sanitized();
        assert_eq!(state.page, 1);
        assert_eq!(state.limit, DEFAULT_LIST_LIMIT);
        assert_eq!(state.status, ALL_STATUSES);
        assert_eq!(state.filter, None);
    }

    #[test]
    fn keys_differ_by_search() {
        let mut state = ListViewState::default();
        let before = state.key("patient", None);
        state.apply(TableEvent::SearchChanged("A".into()));
        assert_ne!(before, state.key("patient", None));
    }
}
