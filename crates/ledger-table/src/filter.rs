//! Column-scoped filters.
//!
//! Whole-row search is the only filtering the report pages perform; column
//! filters are an extension on top of it. A filter only applies when its
//! column is declared and marked `filterable`, and every applicable filter
//! must pass.

use std::fmt;

use ledger_model::{CellValue, ColumnDefinition, DateRange, FieldAccess, find_column};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterPredicate {
    /// Case-insensitive substring.
    Contains(String),
    /// Equality; text compares case-insensitively.
    Equals(CellValue),
    NumberRange { min: Option<f64>, max: Option<f64> },
    DateBetween(DateRange),
    IsEmpty,
    NotEmpty,
}

impl FilterPredicate {
    pub fn matches(&self, value: &CellValue) -> bool {
        match self {
            Self::Contains(needle) => {
                !value.is_null()
                    && value
                        .to_string()
                        .to_lowercase()
                        .contains(&needle.to_lowercase())
            }
            Self::Equals(expected) => match (value, expected) {
                (CellValue::Text(a), CellValue::Text(b)) => a.to_lowercase() == b.to_lowercase(),
                (CellValue::Number(a), CellValue::Number(b)) => a == b,
                (CellValue::Text(a), CellValue::Number(b)) => {
                    a.trim().parse::<f64>().is_ok_and(|n| n == *b)
                }
                _ => value == expected,
            },
            Self::NumberRange { min, max } => value.as_number().is_some_and(|n| {
                min.is_none_or(|lower| n >= lower) && max.is_none_or(|upper| n <= upper)
            }),
            Self::DateBetween(range) => value
                .as_date()
                .is_some_and(|date| range.contains_datetime(date)),
            Self::IsEmpty => is_empty(value),
            Self::NotEmpty => !is_empty(value),
        }
    }
}

fn is_empty(value: &CellValue) -> bool {
    match value {
        CellValue::Null => true,
        CellValue::Text(text) => text.trim().is_empty(),
        _ => false,
    }
}

impl fmt::Display for FilterPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains(needle) => write!(f, "contains \"{needle}\""),
            Self::Equals(value) => write!(f, "= {value}"),
            Self::NumberRange { min, max } => match (min, max) {
                (Some(min), Some(max)) => write!(f, "between {min} and {max}"),
                (Some(min), None) => write!(f, ">= {min}"),
                (None, Some(max)) => write!(f, "<= {max}"),
                (None, None) => f.write_str("any number"),
            },
            Self::DateBetween(range) => write!(f, "within {range}"),
            Self::IsEmpty => f.write_str("is empty"),
            Self::NotEmpty => f.write_str("is not empty"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub key: String,
    pub predicate: FilterPredicate,
}

impl ColumnFilter {
    pub fn new(key: impl Into<String>, predicate: FilterPredicate) -> Self {
        Self {
            key: key.into(),
            predicate,
        }
    }
}

impl fmt::Display for ColumnFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.predicate)
    }
}

/// Filters that target a declared, filterable column.
///
/// Anything else is dropped and logged at debug level.
pub fn applicable_filters<'f>(
    filters: &'f [ColumnFilter],
    columns: &[ColumnDefinition],
) -> Vec<&'f ColumnFilter> {
    filters
        .iter()
        .filter(|filter| match find_column(columns, &filter.key) {
            Some(column) if column.filterable => true,
            Some(_) => {
                debug!(column = %filter.key, "ignoring filter on non-filterable column");
                false
            }
            None => {
                debug!(column = %filter.key, "ignoring filter on unknown column");
                false
            }
        })
        .collect()
}

/// True if the row passes every filter.
pub fn passes_filters<R, A>(row: &R, filters: &[&ColumnFilter], accessor: &A) -> bool
where
    A: FieldAccess<R> + ?Sized,
{
    filters
        .iter()
        .all(|filter| filter.predicate.matches(&accessor.field(row, &filter.key)))
}
