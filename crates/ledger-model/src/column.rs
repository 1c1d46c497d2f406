//! Column definitions and cell formatters.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{ModelError, Result};
use crate::value::{CellValue, format_number};

/// Result of running a formatter over a cell.
///
/// `Text` and `Number` are primitive renderings that exports may use
/// directly. `Markup` is a rich rendering (badge, link, icon) that only the
/// on-screen table understands; exports fall back to the raw value.
#[derive(Debug, Clone, PartialEq)]
pub enum FormattedValue {
    Text(String),
    Number(f64),
    Markup(String),
}

impl FormattedValue {
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::Markup(_))
    }
}

impl fmt::Display for FormattedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) | Self::Markup(value) => f.write_str(value),
            Self::Number(value) => f.write_str(&format_number(*value)),
        }
    }
}

/// Read-only view of the row a formatted cell belongs to.
pub struct RowContext<'a> {
    lookup: &'a dyn Fn(&str) -> CellValue,
}

impl<'a> RowContext<'a> {
    pub fn new(lookup: &'a dyn Fn(&str) -> CellValue) -> Self {
        Self { lookup }
    }

    /// Read a sibling field of the row being formatted.
    pub fn get(&self, key: &str) -> CellValue {
        (self.lookup)(key)
    }
}

pub type FormatFn = dyn Fn(&CellValue, &RowContext<'_>) -> FormattedValue + Send + Sync;

/// Built-in formatters available to table configurations.
#[derive(Debug, Clone, PartialEq)]
pub enum CellFormat {
    /// Two decimals with thousands separators, prefixed by a symbol.
    Currency { symbol: String },
    /// Value already expressed in percent, one decimal.
    Percent,
    /// Rounded number, kept numeric.
    Fixed { decimals: u8 },
    /// Calendar date, e.g. `05 Apr 2024`.
    Date,
    Uppercase,
    /// Status badge; on-screen only.
    Badge,
}

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

impl CellFormat {
    pub fn apply(&self, value: &CellValue) -> FormattedValue {
        if value.is_null() {
            return FormattedValue::Text(String::new());
        }
        match self {
            Self::Currency { symbol } => match value {
                CellValue::Number(n) => FormattedValue::Text(format_currency(symbol, *n)),
                other => FormattedValue::Text(other.to_string()),
            },
            Self::Percent => match value {
                CellValue::Number(n) => FormattedValue::Text(format!("{n:.1}%")),
                other => FormattedValue::Text(other.to_string()),
            },
            Self::Fixed { decimals } => match value {
                CellValue::Number(n) => {
                    let factor = 10f64.powi(i32::from(*decimals));
                    FormattedValue::Number((n * factor).round() / factor)
                }
                other => FormattedValue::Text(other.to_string()),
            },
            Self::Date => match value {
                CellValue::Date(d) => FormattedValue::Text(d.format("%d %b %Y").to_string()),
                other => FormattedValue::Text(other.to_string()),
            },
            Self::Uppercase => FormattedValue::Text(value.to_string().to_uppercase()),
            Self::Badge => FormattedValue::Markup(format!("[{value}]")),
        }
    }
}

impl fmt::Display for CellFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Currency { symbol } => write!(f, "currency:{symbol}"),
            Self::Percent => f.write_str("percent"),
            Self::Fixed { decimals } => write!(f, "fixed:{decimals}"),
            Self::Date => f.write_str("date"),
            Self::Uppercase => f.write_str("uppercase"),
            Self::Badge => f.write_str("badge"),
        }
    }
}

impl FromStr for CellFormat {
    type Err = ModelError;

    /// Parses `currency`, `currency:$`, `percent`, `fixed:2`, `date`,
    /// `uppercase`, `badge`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let (name, arg) = match trimmed.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (trimmed, None),
        };
        match (name.to_ascii_lowercase().as_str(), arg) {
            ("currency", None) => Ok(Self::Currency {
                symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            }),
            ("currency", Some(symbol)) => Ok(Self::Currency {
                symbol: symbol.to_string(),
            }),
            ("percent", None) => Ok(Self::Percent),
            ("fixed", arg) => {
                let decimals = match arg {
                    Some(raw) => raw
                        .parse::<u8>()
                        .map_err(|_| ModelError::UnknownCellFormat(trimmed.to_string()))?,
                    None => 2,
                };
                Ok(Self::Fixed { decimals })
            }
            ("date", None) => Ok(Self::Date),
            ("uppercase", None) => Ok(Self::Uppercase),
            ("badge", None) => Ok(Self::Badge),
            _ => Err(ModelError::UnknownCellFormat(trimmed.to_string())),
        }
    }
}

fn format_currency(symbol: &str, amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}{symbol}{grouped}.{fraction}")
}

/// Formatter attached to a column.
#[derive(Clone)]
pub enum Formatter {
    Builtin(CellFormat),
    Custom(Arc<FormatFn>),
}

impl Formatter {
    pub fn custom<F>(format: F) -> Self
    where
        F: Fn(&CellValue, &RowContext<'_>) -> FormattedValue + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(format))
    }

    pub fn format(&self, value: &CellValue, row: &RowContext<'_>) -> FormattedValue {
        match self {
            Self::Builtin(format) => format.apply(value),
            Self::Custom(format) => format(value, row),
        }
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(format) => f.debug_tuple("Builtin").field(format).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<CellFormat> for Formatter {
    fn from(format: CellFormat) -> Self {
        Self::Builtin(format)
    }
}

/// Static description of one table column, supplied by the hosting page.
#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    /// Field key; unique within a table.
    pub key: String,
    pub header: String,
    pub sortable: bool,
    /// Whether column-scoped filters may target this column.
    pub filterable: bool,
    pub formatter: Option<Formatter>,
    /// Display width hint in characters.
    pub width: Option<u16>,
}

impl ColumnDefinition {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            sortable: true,
            filterable: true,
            formatter: None,
            width: None,
        }
    }

    #[must_use]
    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    #[must_use]
    pub fn with_filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: impl Into<Formatter>) -> Self {
        self.formatter = Some(formatter.into());
        self
    }

    #[must_use]
    pub fn with_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    /// Run the formatter, if any.
    pub fn format(&self, value: &CellValue, row: &RowContext<'_>) -> Option<FormattedValue> {
        self.formatter
            .as_ref()
            .map(|formatter| formatter.format(value, row))
    }

    /// Text shown in the on-screen table.
    pub fn display(&self, value: &CellValue, row: &RowContext<'_>) -> String {
        match self.format(value, row) {
            Some(formatted) => formatted.to_string(),
            None => value.to_string(),
        }
    }
}

/// Find a column by key.
pub fn find_column<'a>(columns: &'a [ColumnDefinition], key: &str) -> Option<&'a ColumnDefinition> {
    columns.iter().find(|column| column.key == key)
}
