//! Drives one list: page state, debounced search, cached results and the
//! table view, wired together the way every list page needs them.
//!
//! The host feeds intents and keystrokes in and performs the fetches the
//! controller asks for; results arriving for a superseded key are stored but
//! never shown.

use std::time::Instant;

use crate::services::listing::{FieldFilter, ListResult};
use crate::table::cache::{ListKey, QueryCache};
use crate::table::debounce::SearchDebouncer;
use crate::table::state::ListViewState;
use crate::table::{DataTable, TableEvent, TableLocalState, TableProps, TableView};

#[derive(Debug)]
pub struct ListController<T> {
    entity: &'static str,
    scope: Option<FieldFilter>,
    state: ListViewState,
    debouncer: SearchDebouncer,
    cache: QueryCache<T>,
}

impl<T> ListController<T> {
    /// `scope` is the filter the page adds on its own (the user's branch).
    pub fn new(entity: &'static str, scope: Option<FieldFilter>, state: ListViewState) -> Self {
        let debouncer = SearchDebouncer::default().with_current(state.search.clone());
        Self {
            entity,
            scope,
            state,
            debouncer,
            cache: QueryCache::default(),
        }
    }

    pub fn state(&self) -> &ListViewState {
        &self.state
    }

    pub fn into_state(self) -> ListViewState {
        self.state
    }

    pub fn key(&self) -> ListKey {
        self.state.key(self.entity, self.scope.clone())
    }

    /// Makes the current state the shown one. Returns the key to fetch when
    /// no result is cached for it.
    pub fn refresh(&mut self) -> Option<ListKey> {
        let key = self.key();
        self.cache.activate(key.clone()).then_some(key)
    }

    /// Applies a table intent. Returns the key to fetch, if any.
    pub fn dispatch(&mut self, event: TableEvent) -> Option<ListKey> {
        if self.state.apply(event) {
            self.refresh()
        } else {
            None
        }
    }

    /// Records raw search box input; nothing is fetched until [`tick`]
    /// releases it.
    ///
    /// [`tick`]: ListController::tick
    pub fn type_search(&mut self, value: impl Into<String>, now: Instant) {
        let value = value.into();
        self.state.search_input = value.clone();
        self.debouncer.input(value, now);
    }

    /// Releases debounced search input. Returns the key to fetch, if any.
    pub fn tick(&mut self, now: Instant) -> Option<ListKey> {
        let event = self.debouncer.poll(now)?;
        self.dispatch(event)
    }

    /// Stores a fetched result. Returns `true` when it is the one shown.
    pub fn resolve(&mut self, key: ListKey, result: ListResult<T>) -> bool {
        self.cache.resolve(key, result)
    }

    pub fn current(&self) -> Option<&ListResult<T>> {
        self.cache.current()
    }

    pub fn props(&self) -> TableProps {
        let total = self.cache.current().map_or(0, |result| result.total);
        self.state.table_props(total, self.cache.is_loading())
    }

    /// Fetches the shown page synchronously with `fetch`.
    ///
    /// A page past the last one is clamped to the last page and fetched
    /// again, so an out-of-range request never renders as empty.
    pub fn load<F>(&mut self, table: &DataTable<T>, fetch: F)
    where
        T: serde::Serialize,
        F: Fn(&ListViewState) -> ListResult<T>,
    {
        if let Some(key) = self.refresh() {
            let result = fetch(&self.state);
            self.resolve(key, result);
        }

        let props = self.props();
        if props.total == 0 {
            return;
        }
        let event = table.page_event(&props, props.page);
        if event != TableEvent::PageChanged(self.state.page)
            && let Some(key) = self.dispatch(event)
        {
            let result = fetch(&self.state);
            self.resolve(key, result);
        }
    }

    /// Table view of the shown result; a skeleton while it is loading.
    pub fn view(&self, table: &DataTable<T>, local: &TableLocalState) -> TableView
    where
        T: serde::Serialize,
    {
        let rows = self.current().map(|r| r.data.as_slice()).unwrap_or_default();
        table.view(rows, &self.props(), local)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::*;
    use crate::table::{Column, TableBody};

    fn table() -> DataTable<u32> {
        DataTable::new(vec![Column::new("n", "N")])
    }

    fn rows(state: &ListViewState, total: u32) -> ListResult<u32> {
        let start = state.offset() as u32;
        ListResult {
            data: (start..total.min(start + state.limit as u32)).collect(),
            total: total as usize,
        }
    }

    #[test]
    fn page_past_the_end_is_clamped_and_refetched() {
        let state = ListViewState {
            page: 4,
            ..ListViewState::default()
        };
        let mut controller = ListController::new("patient", None, state);
        let calls = Cell::new(0);
        controller.load(&table(), |state| {
            calls.set(calls.get() + 1);
            rows(state, 45)
        });

        assert_eq!(calls.get(), 2);
        assert_eq!(controller.state().page, 3);
        assert_eq!(controller.current().map(|r| r.data.len()), Some(5));
        let view = controller.view(&table(), &TableLocalState::default());
        assert_eq!(view.pager.first_row, 41);
    }

    #[test]
    fn empty_results_keep_the_first_page() {
        let mut controller = ListController::new("patient", None, ListViewState::default());
        controller.load(&table(), |state| rows(state, 0));
        let view = controller.view(&table(), &TableLocalState::default());
        assert_eq!(view.body, TableBody::Empty { colspan: 1 });
    }

    #[test]
    fn pending_fetch_renders_a_skeleton() {
        let mut controller: ListController<u32> =
            ListController::new("patient", None, ListViewState::default());
        assert!(controller.refresh().is_some());
        let view = controller.view(&table(), &TableLocalState::default());
        assert!(matches!(view.body, TableBody::Skeleton { columns: 1, .. }));
    }

    #[test]
    fn typing_fetches_once_after_the_pause_and_ignores_late_results() {
        let start = Instant::now();
        let mut controller = ListController::new("patient", None, ListViewState::default());
        controller.load(&table(), |state| rows(state, 30));
        assert_eq!(controller.dispatch(TableEvent::PageChanged(2)), Some(controller.key()));
        controller.resolve(controller.key(), rows(controller.state(), 30));

        controller.type_search("A", start);
        assert_eq!(controller.tick(start + Duration::from_millis(200)), None);
        assert_eq!(controller.state().search_input, "A");
        let key_a = controller
            .tick(start + Duration::from_millis(500))
            .expect("search released");
        assert_eq!(controller.state().page, 1);

        controller.type_search("AB", start + Duration::from_millis(600));
        let key_ab = controller
            .tick(start + Duration::from_millis(1100))
            .expect("search released");

        assert!(controller.resolve(key_ab, ListResult { data: vec![7], total: 1 }));
        assert!(!controller.resolve(key_a, ListResult { data: vec![1, 2], total: 2 }));
        assert_eq!(controller.current().map(|r| r.data.clone()), Some(vec![7]));
    }
}
