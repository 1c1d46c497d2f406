//! Parsing for `--filter` and `--sort` arguments.
//!
//! Filter syntax, one per flag:
//!
//! | Form                         | Predicate                      |
//! |------------------------------|--------------------------------|
//! | `key~text`                   | case-insensitive substring     |
//! | `key=value`                  | equality (numeric if it parses)|
//! | `key>=n` / `key<=n`          | inclusive number bound         |
//! | `key@2024-01-01..2024-03-31` | date within range              |
//! | `key:empty` / `key:present`  | blank or non-blank             |

use anyhow::{Result, bail};
use ledger_model::{CellValue, DateRange, SortSpec};
use ledger_table::{ColumnFilter, FilterPredicate};

const OPERATOR_CHARS: [char; 6] = ['>', '<', '~', '=', '@', ':'];

pub fn parse_filter(expr: &str) -> Result<ColumnFilter> {
    let Some(at) = expr.find(OPERATOR_CHARS) else {
        bail!("filter `{expr}` has no operator (use ~, =, >=, <=, @ or :empty/:present)");
    };
    let key = expr[..at].trim();
    if key.is_empty() {
        bail!("filter `{expr}` is missing a column key");
    }
    let rest = &expr[at..];
    let predicate = if let Some(bound) = rest.strip_prefix(">=") {
        FilterPredicate::NumberRange {
            min: Some(parse_bound(expr, bound)?),
            max: None,
        }
    } else if let Some(bound) = rest.strip_prefix("<=") {
        FilterPredicate::NumberRange {
            min: None,
            max: Some(parse_bound(expr, bound)?),
        }
    } else if let Some(needle) = rest.strip_prefix('~') {
        FilterPredicate::Contains(needle.to_string())
    } else if let Some(value) = rest.strip_prefix('=') {
        let value = value.trim();
        match value.parse::<f64>() {
            Ok(number) if number.is_finite() => FilterPredicate::Equals(CellValue::Number(number)),
            _ => FilterPredicate::Equals(CellValue::text(value)),
        }
    } else if let Some(range) = rest.strip_prefix('@') {
        let Some((from, to)) = range.split_once("..") else {
            bail!("filter `{expr}` needs a range like 2024-01-01..2024-03-31");
        };
        FilterPredicate::DateBetween(DateRange::parse(from, to)?)
    } else {
        match rest.trim_start_matches(':').trim() {
            "empty" => FilterPredicate::IsEmpty,
            "present" => FilterPredicate::NotEmpty,
            other => bail!("filter `{expr}` has unknown test `{other}`"),
        }
    };
    Ok(ColumnFilter::new(key, predicate))
}

fn parse_bound(expr: &str, raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => bail!("filter `{expr}` needs a number, got `{}`", raw.trim()),
    }
}

/// Parse `key`, `key:asc` or `key:desc`.
pub fn parse_sort(expr: &str) -> Result<SortSpec> {
    let (key, direction) = match expr.split_once(':') {
        Some((key, direction)) => (key.trim(), direction.trim().to_ascii_lowercase()),
        None => (expr.trim(), "asc".to_string()),
    };
    if key.is_empty() {
        bail!("sort `{expr}` is missing a column key");
    }
    match direction.as_str() {
        "asc" => Ok(SortSpec::asc(key)),
        "desc" => Ok(SortSpec::desc(key)),
        other => bail!("sort direction must be asc or desc, got `{other}`"),
    }
}
