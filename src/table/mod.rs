//! Entity-agnostic data table.
//!
//! The table is controlled: the hosting page owns rows, paging and filters
//! and hands them in on every render. The table only keeps transient UI
//! state ([`TableLocalState`]) and reports user intents as [`TableEvent`]s.

use serde::Serialize;
use serde_json::Value;

use crate::pagination::{Pager, PagerView};
use crate::table::sort::{SortDirection, SortKey, sorted_indices};

pub mod cache;
pub mod controller;
pub mod debounce;
pub mod sort;
pub mod state;

/// Placeholder rows shown while loading.
pub const SKELETON_ROWS: usize = 5;

type Renderer<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

/// How one field of `T` is shown.
pub struct Column<T> {
    pub key: String,
    pub header: String,
    pub render: Option<Renderer<T>>,
    pub sortable: bool,
}

impl<T: Serialize> Column<T> {
    /// Column showing the serialized field `key` as is.
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            render: None,
            sortable: false,
        }
    }

    pub fn render(mut self, render: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.render = Some(Box::new(render));
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    fn raw(&self, row: &Value) -> Value {
        row.get(&self.key).cloned().unwrap_or(Value::Null)
    }

    fn cell(&self, row: &T, serialized: &Value) -> String {
        match &self.render {
            Some(render) => render(row),
            None => match self.raw(serialized) {
                Value::Null => String::new(),
                Value::String(s) => s,
                other => other.to_string(),
            },
        }
    }

    /// Without a renderer the raw value is compared, so numbers keep
    /// numeric order even when rendered as currency.
    fn sort_key(&self, row: &T, serialized: &Value) -> SortKey {
        match &self.render {
            None => SortKey::from_value(&self.raw(serialized)),
            Some(_) => match self.raw(serialized) {
                Value::Null => SortKey::from_text(&self.cell(row, serialized)),
                raw => SortKey::from_value(&raw),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusTab {
    pub label: String,
    pub value: String,
}

impl StatusTab {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
}

impl FilterOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// User intents emitted by the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    PageChanged(usize),
    LimitChanged(usize),
    SearchChanged(String),
    StatusChanged(String),
    FilterChanged(Option<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: usize,
    pub direction: SortDirection,
}

/// UI state that never leaves the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableLocalState {
    pub sort: Option<SortState>,
    pub filter_open: bool,
}

impl TableLocalState {
    /// Sorts by `column`, flipping the direction on repeated clicks.
    pub fn toggle_sort(&mut self, column: usize) {
        self.sort = Some(match self.sort {
            Some(sort) if sort.column == column => SortState {
                column,
                direction: sort.direction.flip(),
            },
            _ => SortState {
                column,
                direction: SortDirection::Asc,
            },
        });
    }

    pub fn toggle_filter(&mut self) {
        self.filter_open = !self.filter_open;
    }
}

/// Data handed to the table on every render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableProps {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub is_loading: bool,
    pub status: String,
    pub search: String,
    pub filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderView {
    pub key: String,
    pub header: String,
    pub sortable: bool,
    pub sort: Option<SortDirection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabView {
    pub label: String,
    pub value: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionView {
    pub label: String,
    pub value: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterView {
    pub label: String,
    pub open: bool,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub link: Option<String>,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableBody {
    Skeleton { rows: usize, columns: usize },
    Empty { colspan: usize },
    Rows { rows: Vec<RowView> },
}

/// Render-ready table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub headers: Vec<HeaderView>,
    pub body: TableBody,
    pub status_tabs: Vec<TabView>,
    pub filter: Option<FilterView>,
    pub search: String,
    pub pager: PagerView,
}

pub struct DataTable<T> {
    columns: Vec<Column<T>>,
    status_tabs: Vec<StatusTab>,
    filter_label: String,
    filter_options: Vec<FilterOption>,
    row_link: Option<Renderer<T>>,
}

impl<T: Serialize> DataTable<T> {
    pub fn new(columns: Vec<Column<T>>) -> Self {
        Self {
            columns,
            status_tabs: Vec::new(),
            filter_label: String::new(),
            filter_options: Vec::new(),
            row_link: None,
        }
    }

    pub fn status_tabs(mut self, tabs: Vec<StatusTab>) -> Self {
        self.status_tabs = tabs;
        self
    }

    pub fn filter_options(mut self, label: impl Into<String>, options: Vec<FilterOption>) -> Self {
        self.filter_label = label.into();
        self.filter_options = options;
        self
    }

    pub fn row_link(mut self, link: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.row_link = Some(Box::new(link));
        self
    }

    /// Intent for a pager click, clamped to the existing pages.
    pub fn page_event(&self, props: &TableProps, page: usize) -> TableEvent {
        TableEvent::PageChanged(Pager::new(props.total, props.limit, page).page())
    }

    pub fn view(&self, rows: &[T], props: &TableProps, local: &TableLocalState) -> TableView {
        let sort = local.sort.filter(|s| {
            self.columns
                .get(s.column)
                .is_some_and(|column| column.sortable)
        });

        let headers = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| HeaderView {
                key: column.key.clone(),
                header: column.header.clone(),
                sortable: column.sortable,
                sort: sort.filter(|s| s.column == i).map(|s| s.direction),
            })
            .collect();

        let body = if props.is_loading {
            TableBody::Skeleton {
                rows: SKELETON_ROWS,
                columns: self.columns.len(),
            }
        } else if rows.is_empty() {
            TableBody::Empty {
                colspan: self.columns.len().max(1),
            }
        } else {
            TableBody::Rows {
                rows: self.rows(rows, sort),
            }
        };

        let status_tabs = self
            .status_tabs
            .iter()
            .map(|tab| TabView {
                label: tab.label.clone(),
                value: tab.value.clone(),
                active: tab.value == props.status,
            })
            .collect();

        let filter = (!self.filter_options.is_empty()).then(|| FilterView {
            label: self.filter_label.clone(),
            open: local.filter_open,
            options: self
                .filter_options
                .iter()
                .map(|option| OptionView {
                    label: option.label.clone(),
                    value: option.value.clone(),
                    selected: props.filter.as_deref() == Some(option.value.as_str()),
                })
                .collect(),
        });

        TableView {
            headers,
            body,
            status_tabs,
            filter,
            search: props.search.clone(),
            pager: Pager::new(props.total, props.limit, props.page).view(),
        }
    }

    fn rows(&self, rows: &[T], sort: Option<SortState>) -> Vec<RowView> {
        let serialized: Vec<Value> = rows
            .iter()
            .map(|row| serde_json::to_value(row).unwrap_or(Value::Null))
            .collect();

        let order = match sort {
            Some(sort) => {
                let column = &self.columns[sort.column];
                let keys: Vec<SortKey> = rows
                    .iter()
                    .zip(&serialized)
                    .map(|(row, value)| column.sort_key(row, value))
                    .collect();
                sorted_indices(&keys, sort.direction)
            }
            None => (0..rows.len()).collect(),
        };

        order
            .into_iter()
            .map(|i| RowView {
                link: self.row_link.as_ref().map(|link| link(&rows[i])),
                cells: self
                    .columns
                    .iter()
                    .map(|column| column.cell(&rows[i], &serialized[i]))
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct Row {
        code: &'static str,
        name: &'static str,
        amount: f64,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                code: "BN0010",
                name: "Lan",
                amount: 1_200_000.0,
            },
            Row {
                code: "BN0002",
                name: "Tran Hoa",
                amount: 90_000.0,
            },
            Row {
                code: "BN0007",
                name: "Minh",
                amount: 350_000.0,
            },
        ]
    }

    fn table() -> DataTable<Row> {
        DataTable::new(vec![
            Column::new("code", "Code").sortable(),
            Column::new("name", "Name"),
            Column::new("amount", "Amount")
                .render(|row: &Row| format!("{:.0} VND", row.amount))
                .sortable(),
        ])
        .status_tabs(vec![StatusTab::new("All", "all"), StatusTab::new("Paid", "paid")])
    }

    fn props(total: usize, is_loading: bool) -> TableProps {
        TableProps {
            page: 1,
            limit: 20,
            total,
            is_loading,
            status: "all".into(),
            search: String::new(),
            filter: None,
        }
    }

    fn first_cells(view: &TableView) -> Vec<String> {
        match &view.body {
            TableBody::Rows { rows } => rows.iter().map(|r| r.cells[0].clone()).collect(),
            other => panic!("expected rows, got {other:?}"),
        }
    }

    #[test]
    fn loading_renders_skeleton_not_empty_state() {
        let view = table().view(&[], &props(0, true), &TableLocalState::default());
        assert_eq!(
            view.body,
            TableBody::Skeleton {
                rows: SKELETON_ROWS,
                columns: 3
            }
        );
    }

    #[test]
    fn loaded_without_rows_renders_one_empty_row() {
        let view = table().view(&[], &props(0, false), &TableLocalState::default());
        assert_eq!(view.body, TableBody::Empty { colspan: 3 });
        assert_eq!(view.pager.page_count, 1);
    }

    #[test]
    fn cells_use_renderers_and_raw_values() {
        let view = table().view(&rows(), &props(3, false), &TableLocalState::default());
        let TableBody::Rows { rows } = &view.body else {
            panic!("expected rows");
        };
        assert_eq!(rows[0].cells, vec!["BN0010", "Lan", "1200000 VND"]);
        assert!(view.status_tabs[0].active);
        assert!(!view.status_tabs[1].active);
    }

    #[test]
    fn sorting_reorders_loaded_rows_only() {
        let table = table();
        let mut local = TableLocalState::default();

        local.toggle_sort(0);
        let view = table.view(&rows(), &props(3, false), &local);
        assert_eq!(first_cells(&view), vec!["BN0002", "BN0007", "BN0010"]);
        assert_eq!(view.headers[0].sort, Some(SortDirection::Asc));

        local.toggle_sort(2);
        local.toggle_sort(2);
        let view = table.view(&rows(), &props(3, false), &local);
        assert_eq!(first_cells(&view), vec!["BN0010", "BN0007", "BN0002"]);
        assert_eq!(view.headers[2].sort, Some(SortDirection::Desc));
    }

    #[test]
    fn unsortable_columns_are_ignored() {
        let mut local = TableLocalState::default();
        local.toggle_sort(1);
        let view = table().view(&rows(), &props(3, false), &local);
        assert_eq!(first_cells(&view), vec!["BN0010", "BN0002", "BN0007"]);
        assert!(view.headers.iter().all(|h| h.sort.is_none()));
    }

    #[test]
    fn page_clicks_are_clamped() {
        let props = props(45, false);
        assert_eq!(table().page_event(&props, 4), TableEvent::PageChanged(3));
        assert_eq!(table().page_event(&props, 0), TableEvent::PageChanged(1));
    }

    #[test]
    fn filter_options_mark_the_selection() {
        let table = table().filter_options(
            "Category",
            vec![
                FilterOption::new("Consumables", "consumables"),
                FilterOption::new("Drugs", "drugs"),
            ],
        );
        let props = TableProps {
            filter: Some("drugs".into()),
            ..props(0, false)
        };
        let mut local = TableLocalState::default();
        let view = table.view(&[], &props, &local);
        let filter = view.filter.unwrap();
        assert!(!filter.options[0].selected);
        assert!(filter.options[1].selected);
        assert!(!filter.open);

        local.toggle_filter();
        assert!(table.view(&[], &props, &local).filter.unwrap().open);
    }
}
