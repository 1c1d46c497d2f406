//! Row loading from JSON and CSV files.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use ledger_model::{CellValue, Record, ValueKind};
use tracing::info;

/// Rows plus the field keys in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct LoadedRows {
    pub rows: Vec<Record>,
    pub keys: Vec<String>,
}

/// Load rows from `path`, chosen by extension (`.json` or `.csv`).
///
/// `kinds` coerces text input for declared columns; undeclared CSV columns
/// stay text.
pub fn load_rows(path: &Path, kinds: &BTreeMap<String, ValueKind>) -> Result<LoadedRows> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let loaded = match extension.as_deref() {
        Some("json") => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read {}", path.display()))?;
            rows_from_json(&text, kinds).with_context(|| format!("parse {}", path.display()))?
        }
        Some("csv") => {
            let reader = csv::Reader::from_path(path)
                .with_context(|| format!("open {}", path.display()))?;
            rows_from_csv(reader, kinds).with_context(|| format!("parse {}", path.display()))?
        }
        _ => bail!(
            "unsupported data file {} (expected .json or .csv)",
            path.display()
        ),
    };
    info!(
        path = %path.display(),
        rows = loaded.rows.len(),
        fields = loaded.keys.len(),
        "loaded rows"
    );
    Ok(loaded)
}

/// Parse a JSON array of objects.
pub fn rows_from_json(text: &str, kinds: &BTreeMap<String, ValueKind>) -> Result<LoadedRows> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Array(items) = value else {
        bail!("expected a JSON array of objects");
    };
    let mut loaded = LoadedRows::default();
    for (idx, item) in items.into_iter().enumerate() {
        let serde_json::Value::Object(map) = item else {
            bail!("row {idx} is not a JSON object");
        };
        let mut record = Record::new();
        for (key, value) in map {
            let cell = match (&value, kinds.get(&key)) {
                (serde_json::Value::String(raw), Some(kind)) => CellValue::parse_as(*kind, raw),
                _ => CellValue::from(&value),
            };
            loaded.note_key(&key);
            record.insert(key, cell);
        }
        loaded.rows.push(record);
    }
    Ok(loaded)
}

/// Parse CSV with a header row.
pub fn rows_from_csv<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    kinds: &BTreeMap<String, ValueKind>,
) -> Result<LoadedRows> {
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let mut loaded = LoadedRows::default();
    for header in &headers {
        loaded.note_key(header);
    }
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("record {}", idx + 1))?;
        let row: Record = headers
            .iter()
            .zip(record.iter())
            .map(|(key, raw)| {
                let kind = kinds.get(key).copied().unwrap_or_default();
                (key.clone(), CellValue::parse_as(kind, raw))
            })
            .collect();
        loaded.rows.push(row);
    }
    Ok(loaded)
}

impl LoadedRows {
    fn note_key(&mut self, key: &str) {
        if !self.keys.iter().any(|existing| existing == key) {
            self.keys.push(key.to_string());
        }
    }
}
