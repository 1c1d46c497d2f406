//! Row filter/sort pipeline.
//!
//! The full row set is sorted first and then filtered. Filtering does not
//! depend on order, so this only matters for how ties resolve.

use ledger_model::{FieldAccess, PropertyLookup, Row, SortSpec};

use crate::filter::{ColumnFilter, passes_filters};
use crate::search::{matches_search, normalize_term};
use crate::sort::sort_rows;

/// Search and sort rows read through property lookup.
pub fn apply<'a, R: Row>(rows: &'a [R], search_term: &str, sort: &SortSpec) -> Vec<&'a R> {
    apply_with(rows, search_term, sort, &PropertyLookup)
}

/// Search and sort rows read through `accessor`.
pub fn apply_with<'a, R, A>(
    rows: &'a [R],
    search_term: &str,
    sort: &SortSpec,
    accessor: &A,
) -> Vec<&'a R>
where
    A: FieldAccess<R> + ?Sized,
{
    apply_filtered(rows, search_term, &[], sort, accessor)
}

/// Search, column-filter and sort rows.
///
/// `filters` should already be narrowed to applicable columns with
/// [`crate::applicable_filters`].
pub fn apply_filtered<'a, R, A>(
    rows: &'a [R],
    search_term: &str,
    filters: &[&ColumnFilter],
    sort: &SortSpec,
    accessor: &A,
) -> Vec<&'a R>
where
    A: FieldAccess<R> + ?Sized,
{
    let needle = normalize_term(search_term);
    let mut ordered = sort_rows(rows, sort, accessor);
    ordered.retain(|row| {
        matches_search(*row, &needle, accessor) && passes_filters(*row, filters, accessor)
    });
    ordered
}
