//! Table engine for the ledger report pages.
//!
//! Given a row slice, a search term, a [`SortSpec`](ledger_model::SortSpec)
//! and optional column filters, produces the ordered subset of rows to
//! display. Also tracks which columns are visible for each table instance.

pub mod collate;
pub mod engine;
pub mod filter;
pub mod search;
pub mod sort;
pub mod state;
pub mod summary;
pub mod visibility;

pub use collate::locale_compare;
pub use engine::{apply, apply_filtered, apply_with};
pub use filter::{ColumnFilter, FilterPredicate, applicable_filters, passes_filters};
pub use search::{matches_search, normalize_term};
pub use sort::{compare_cells, sort_rows, stable_order};
pub use state::TableState;
pub use summary::{NumericSummary, share_of, summarize};
pub use visibility::ColumnVisibility;
