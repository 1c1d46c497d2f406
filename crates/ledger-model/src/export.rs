//! Export options and the serialized view handed to exporters.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::error::{ModelError, Result};
use crate::value::format_number;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Excel,
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [Self::Csv, Self::Excel, Self::Pdf];

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "xlsx",
            Self::Pdf => "pdf",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Excel => "Excel",
            Self::Pdf => "PDF",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExportFormat {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "excel" | "xlsx" => Ok(Self::Excel),
            "pdf" => Ok(Self::Pdf),
            other => Err(ModelError::UnknownFormat(other.to_string())),
        }
    }
}

/// Charts can only be embedded in PDF exports; the toggle is ignored for
/// every other format.
pub fn effective_include_charts(format: ExportFormat, requested: bool) -> bool {
    requested && format == ExportFormat::Pdf
}

/// User-chosen export settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Base file name without extension.
    pub filename: String,
    pub title: String,
    pub include_charts: bool,
    pub date_range: Option<DateRange>,
}

impl ExportOptions {
    pub fn new(filename: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            title: title.into(),
            include_charts: false,
            date_range: None,
        }
    }

    #[must_use]
    pub fn with_include_charts(mut self, include_charts: bool) -> Self {
        self.include_charts = include_charts;
        self
    }

    #[must_use]
    pub fn with_date_range(mut self, date_range: Option<DateRange>) -> Self {
        self.date_range = date_range;
        self
    }

    /// Output file name for `format`, e.g. `report.csv`.
    pub fn file_name(&self, format: ExportFormat) -> String {
        format!("{}.{}", self.filename.trim(), format.extension())
    }
}

/// One exported cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportCell {
    Text(String),
    Number(f64),
}

impl ExportCell {
    pub fn empty() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for ExportCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Number(value) => f.write_str(&format_number(*value)),
        }
    }
}

impl From<&str> for ExportCell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for ExportCell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportMetadata {
    pub record_count: usize,
    /// Display form of the covered range, e.g. `All dates`.
    pub date_range: String,
    pub generated_at: DateTime<Utc>,
}

/// The current view, flattened for serialization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<ExportCell>>,
    pub metadata: Option<ExportMetadata>,
}

impl ExportData {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<ExportCell>>) -> Self {
        Self {
            headers,
            rows,
            metadata: None,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: ExportMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn record_count(&self) -> usize {
        self.rows.len()
    }
}
