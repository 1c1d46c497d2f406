//! Report configuration files.
//!
//! A report is described by a TOML file:
//!
//! ```toml
//! title = "Receivables"
//! filename = "receivables"
//!
//! [[columns]]
//! key = "party"
//! header = "Party"
//!
//! [[columns]]
//! key = "amount"
//! header = "Amount"
//! kind = "number"
//! format = "currency"
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result, bail};
use ledger_model::{CellFormat, ColumnDefinition, ValueKind};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// Default export filename (without extension).
    pub filename: Option<String>,
    pub columns: Vec<ColumnConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnConfig {
    pub key: String,
    /// Defaults to the key.
    pub header: Option<String>,
    #[serde(default = "enabled")]
    pub sortable: bool,
    #[serde(default = "enabled")]
    pub filterable: bool,
    /// Coercion applied to CSV input and to JSON strings.
    pub kind: Option<ValueKind>,
    /// Built-in formatter name, e.g. `currency:$` or `fixed:2`.
    pub format: Option<String>,
    pub width: Option<u16>,
}

fn default_title() -> String {
    "Report".to_string()
}

fn enabled() -> bool {
    true
}

impl ReportConfig {
    /// Read and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// One text column per key, used when no configuration file is given.
    pub fn inferred<I, K>(title: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            title: title.into(),
            filename: None,
            columns: keys
                .into_iter()
                .map(|key| ColumnConfig {
                    key: key.into(),
                    header: None,
                    sortable: true,
                    filterable: true,
                    kind: None,
                    format: None,
                    width: None,
                })
                .collect(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            bail!("config declares no columns");
        }
        let mut seen = BTreeSet::new();
        for column in &self.columns {
            if column.key.trim().is_empty() {
                bail!("column key must not be empty");
            }
            if !seen.insert(column.key.as_str()) {
                bail!("duplicate column key: {}", column.key);
            }
        }
        Ok(())
    }

    /// Declared kind per column key; columns without one are left out.
    pub fn kinds(&self) -> BTreeMap<String, ValueKind> {
        self.columns
            .iter()
            .filter_map(|column| column.kind.map(|kind| (column.key.clone(), kind)))
            .collect()
    }

    pub fn column_definitions(&self) -> Result<Vec<ColumnDefinition>> {
        self.columns.iter().map(ColumnConfig::definition).collect()
    }
}

impl ColumnConfig {
    pub fn definition(&self) -> Result<ColumnDefinition> {
        let header = self.header.clone().unwrap_or_else(|| self.key.clone());
        let mut column = ColumnDefinition::new(self.key.clone(), header)
            .with_sortable(self.sortable)
            .with_filterable(self.filterable);
        if let Some(format) = &self.format {
            let format: CellFormat = format
                .parse()
                .with_context(|| format!("column {}", self.key))?;
            column = column.with_formatter(format);
        }
        if let Some(width) = self.width {
            column = column.with_width(width);
        }
        Ok(column)
    }
}
