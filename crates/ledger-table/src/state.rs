//! Per-table UI state.
//!
//! Each table instance owns one [`TableState`]: its column list, sort spec,
//! search term, visible columns, column filters and loading flag. Nothing is
//! shared between tables and nothing persists beyond the owning page.

use ledger_model::{ColumnDefinition, FieldAccess, PropertyLookup, Row, SortSpec, find_column};
use tracing::debug;

use crate::engine::apply_filtered;
use crate::filter::{ColumnFilter, applicable_filters};
use crate::visibility::ColumnVisibility;

#[derive(Debug, Clone)]
pub struct TableState {
    columns: Vec<ColumnDefinition>,
    sort: SortSpec,
    search: String,
    visibility: ColumnVisibility,
    filters: Vec<ColumnFilter>,
    loading: bool,
}

impl TableState {
    pub fn new(columns: Vec<ColumnDefinition>) -> Self {
        let visibility = ColumnVisibility::initialize(&columns);
        Self {
            columns,
            sort: SortSpec::none(),
            search: String::new(),
            visibility,
            filters: Vec::new(),
            loading: false,
        }
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn visibility(&self) -> &ColumnVisibility {
        &self.visibility
    }

    pub fn filters(&self) -> &[ColumnFilter] {
        &self.filters
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Apply a header click. Returns false (and leaves the spec alone) when
    /// the column is unknown or not sortable.
    pub fn click_header(&mut self, key: &str) -> bool {
        match find_column(&self.columns, key) {
            Some(column) if column.sortable => {
                self.sort = self.sort.cycled(key);
                true
            }
            _ => {
                debug!(column = key, "header click ignored");
                false
            }
        }
    }

    /// Replace the sort spec directly, bypassing the header click cycle.
    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    pub fn toggle_column(&mut self, key: &str) -> bool {
        self.visibility.toggle(key)
    }

    pub fn add_filter(&mut self, filter: ColumnFilter) {
        self.filters.push(filter);
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Swap in a new column list.
    ///
    /// Visible keys are intersected with the new keys and a sort on a column
    /// that no longer exists is cleared.
    pub fn set_columns(&mut self, columns: Vec<ColumnDefinition>) {
        self.columns = columns;
        self.visibility.reconcile(&self.columns);
        if let Some((key, _)) = self.sort.active()
            && find_column(&self.columns, key).is_none()
        {
            self.sort = SortSpec::none();
        }
    }

    pub fn visible_columns(&self) -> Vec<&ColumnDefinition> {
        self.visibility.project(&self.columns)
    }

    /// Rows to render. Empty while loading.
    pub fn visible_rows<'a, R: Row>(&self, rows: &'a [R]) -> Vec<&'a R> {
        self.visible_rows_with(rows, &PropertyLookup)
    }

    pub fn visible_rows_with<'a, R, A>(&self, rows: &'a [R], accessor: &A) -> Vec<&'a R>
    where
        A: FieldAccess<R> + ?Sized,
    {
        if self.loading {
            return Vec::new();
        }
        let filters = applicable_filters(&self.filters, &self.columns);
        apply_filtered(rows, &self.search, &filters, &self.sort, accessor)
    }
}
