//! Cell values read from rows.
//!
//! Every field a row exposes is surfaced as a [`CellValue`]. Missing keys and
//! JSON `null` both read as [`CellValue::Null`], so callers never need to
//! distinguish "absent" from "empty".

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A single field value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(DateTime<Utc>),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(value) => Some(*value),
            _ => None,
        }
    }

    /// The form whole-row search matches against: the display form, except
    /// that `Null` reads as `null`.
    pub fn search_text(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed("null"),
            Self::Text(value) => Cow::Borrowed(value),
            other => Cow::Owned(other.to_string()),
        }
    }

    /// Coerce a raw string into a value of the given kind.
    ///
    /// Blank input becomes `Null`. Input that does not parse as the requested
    /// kind is kept as text rather than rejected.
    pub fn parse_as(kind: ValueKind, raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Null;
        }
        let parsed = match kind {
            ValueKind::Text => None,
            ValueKind::Number => parse_number(trimmed).map(Self::Number),
            ValueKind::Date => parse_date(trimmed).map(Self::Date),
            ValueKind::Bool => parse_bool(trimmed).map(Self::Bool),
        };
        parsed.unwrap_or_else(|| Self::Text(raw.to_string()))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Text(value) => f.write_str(value),
            Self::Number(value) => f.write_str(&format_number(*value)),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Date(value) => f.write_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

/// Render a number the way a plain string conversion would: no trailing
/// `.0` for integral values, exponent form outside `1e-6..1e21`.
pub fn format_number(value: f64) -> String {
    if value.is_infinite() {
        return if value.is_sign_negative() {
            "-Infinity".to_string()
        } else {
            "Infinity".to_string()
        };
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        };
    }
    format!("{value}")
}

fn parse_number(value: &str) -> Option<f64> {
    let cleaned: String = value.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|n| !n.is_nan())
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Declared kind of a column, used when coercing untyped input (CSV).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    #[default]
    Text,
    Number,
    Date,
    Bool,
}

impl FromStr for ValueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "string" => Ok(Self::Text),
            "number" | "numeric" => Ok(Self::Number),
            "date" => Ok(Self::Date),
            "bool" | "boolean" => Ok(Self::Bool),
            other => Err(format!("unknown value kind: {other}")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        match value.and_hms_opt(0, 0, 0) {
            Some(dt) => Self::Date(dt.and_utc()),
            None => Self::Null,
        }
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        Self::from(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_display_without_trailing_zero() {
        assert_eq!(CellValue::Number(50.0).to_string(), "50");
        assert_eq!(CellValue::Number(1.5).to_string(), "1.5");
        assert_eq!(CellValue::Number(-0.25).to_string(), "-0.25");
        assert_eq!(CellValue::Number(f64::INFINITY).to_string(), "Infinity");
    }

    #[test]
    fn extreme_numbers_use_exponent_form() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(1.5e20), "150000000000000000000");
        assert_eq!(format_number(0.000_001), "0.000001");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn null_displays_empty() {
        assert_eq!(CellValue::Null.to_string(), "");
    }

    #[test]
    fn search_text_spells_out_null() {
        assert_eq!(CellValue::Null.search_text(), "null");
        assert_eq!(CellValue::text("Acme").search_text(), "Acme");
        assert_eq!(CellValue::Number(50.0).search_text(), "50");
        assert_eq!(CellValue::Bool(false).search_text(), "false");
    }

    #[test]
    fn parse_as_coerces_or_keeps_text() {
        assert_eq!(
            CellValue::parse_as(ValueKind::Number, "1,250.50"),
            CellValue::Number(1250.5)
        );
        assert_eq!(
            CellValue::parse_as(ValueKind::Number, "n/a"),
            CellValue::text("n/a")
        );
        assert_eq!(CellValue::parse_as(ValueKind::Number, "  "), CellValue::Null);
        assert_eq!(
            CellValue::parse_as(ValueKind::Bool, "Yes"),
            CellValue::Bool(true)
        );
        let date = CellValue::parse_as(ValueKind::Date, "2024-03-31");
        assert_eq!(
            date.as_date().map(|d| d.date_naive()),
            NaiveDate::from_ymd_opt(2024, 3, 31)
        );
    }

    #[test]
    fn json_values_convert() {
        let value = serde_json::json!({"a": [1, 2]});
        assert_eq!(CellValue::from(&value["a"]), CellValue::text("[1,2]"));
        assert_eq!(CellValue::from(&serde_json::Value::Null), CellValue::Null);
        assert_eq!(
            CellValue::from(&serde_json::json!(12)),
            CellValue::Number(12.0)
        );
    }
}
