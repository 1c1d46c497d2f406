//! Flattening the current view into [`ExportData`].

use ledger_model::{
    CellValue, ColumnDefinition, ExportCell, ExportData, FieldAccess, FormattedValue, RowContext,
};

/// Headers and cells for `rows` under the visible `columns`.
///
/// With no visible columns every row flattens to an empty record.
pub fn build_export_data<R, A>(
    rows: &[&R],
    columns: &[&ColumnDefinition],
    accessor: &A,
) -> ExportData
where
    A: FieldAccess<R> + ?Sized,
{
    let headers = columns.iter().map(|column| column.header.clone()).collect();
    let cells = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| export_cell(column, *row, accessor))
                .collect()
        })
        .collect();
    ExportData::new(headers, cells)
}

/// One exported cell.
///
/// A formatter that yields text or a number wins. Markup renderings and
/// columns without a formatter fall back to the raw value.
pub fn export_cell<R, A>(column: &ColumnDefinition, row: &R, accessor: &A) -> ExportCell
where
    A: FieldAccess<R> + ?Sized,
{
    let raw = accessor.field(row, &column.key);
    let lookup = |key: &str| accessor.field(row, key);
    let context = RowContext::new(&lookup);
    match column.format(&raw, &context) {
        Some(FormattedValue::Text(text)) => ExportCell::Text(text),
        Some(FormattedValue::Number(number)) => ExportCell::Number(number),
        Some(FormattedValue::Markup(_)) | None => raw_cell(&raw),
    }
}

fn raw_cell(value: &CellValue) -> ExportCell {
    match value {
        CellValue::Null => ExportCell::empty(),
        CellValue::Text(text) => ExportCell::Text(text.clone()),
        CellValue::Number(number) => ExportCell::Number(*number),
        other => ExportCell::Text(other.to_string()),
    }
}
