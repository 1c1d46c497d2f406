//! Row ordering.

use std::cmp::Ordering;

use ledger_model::{CellValue, FieldAccess, SortDirection, SortSpec};

use crate::collate::locale_compare;

/// Compare two cells under `direction`.
///
/// Nulls go after every non-null value in both directions. Text, numbers and
/// dates compare within their own type; any other pairing is equal.
pub fn compare_cells(a: &CellValue, b: &CellValue, direction: SortDirection) -> Ordering {
    let ordering = match (a, b) {
        (CellValue::Null, CellValue::Null) => return Ordering::Equal,
        (CellValue::Null, _) => return Ordering::Greater,
        (_, CellValue::Null) => return Ordering::Less,
        (CellValue::Text(x), CellValue::Text(y)) => locale_compare(x, y),
        (CellValue::Number(x), CellValue::Number(y)) => {
            x.partial_cmp(y).unwrap_or(Ordering::Equal)
        }
        (CellValue::Date(x), CellValue::Date(y)) => {
            x.timestamp_millis().cmp(&y.timestamp_millis())
        }
        _ => Ordering::Equal,
    };
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Order `rows` by `spec`. Without an active key the input order is kept.
pub fn sort_rows<'a, R, A>(rows: &'a [R], spec: &SortSpec, accessor: &A) -> Vec<&'a R>
where
    A: FieldAccess<R> + ?Sized,
{
    let Some((key, direction)) = spec.active() else {
        return rows.iter().collect();
    };
    let keys: Vec<CellValue> = rows.iter().map(|row| accessor.field(row, key)).collect();
    let order = stable_order(keys.len(), |a, b| compare_cells(&keys[a], &keys[b], direction));
    order.into_iter().map(|idx| &rows[idx]).collect()
}

/// Stable permutation of `0..len` under `compare`.
///
/// Mixed-type cells compare equal to everything, which is not a total order,
/// so this uses a merge sort that tolerates inconsistent comparators instead
/// of `slice::sort_by`.
pub fn stable_order<F>(len: usize, mut compare: F) -> Vec<usize>
where
    F: FnMut(usize, usize) -> Ordering,
{
    let mut order: Vec<usize> = (0..len).collect();
    let mut buffer = vec![0usize; len];
    merge_sort(&mut order, &mut buffer, &mut compare);
    order
}

const INSERTION_THRESHOLD: usize = 12;

fn merge_sort<F>(order: &mut [usize], buffer: &mut [usize], compare: &mut F)
where
    F: FnMut(usize, usize) -> Ordering,
{
    let len = order.len();
    if len <= INSERTION_THRESHOLD {
        insertion_sort(order, compare);
        return;
    }
    let mid = len / 2;
    {
        let (left, right) = order.split_at_mut(mid);
        let (left_buf, right_buf) = buffer.split_at_mut(mid);
        merge_sort(left, left_buf, compare);
        merge_sort(right, right_buf, compare);
    }
    buffer[..len].copy_from_slice(order);
    let (left, right) = buffer[..len].split_at(mid);
    let (mut i, mut j) = (0, 0);
    for slot in order.iter_mut() {
        let take_right = if i >= left.len() {
            true
        } else if j >= right.len() {
            false
        } else {
            compare(left[i], right[j]) == Ordering::Greater
        };
        if take_right {
            *slot = right[j];
            j += 1;
        } else {
            *slot = left[i];
            i += 1;
        }
    }
}

fn insertion_sort<F>(order: &mut [usize], compare: &mut F)
where
    F: FnMut(usize, usize) -> Ordering,
{
    for start in 1..order.len() {
        let mut pos = start;
        while pos > 0 && compare(order[pos - 1], order[pos]) == Ordering::Greater {
            order.swap(pos - 1, pos);
            pos -= 1;
        }
    }
}
