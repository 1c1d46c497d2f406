//! Terminal tables for views, column listings and export receipts.

use std::path::Path;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use ledger_export::ExportReceipt;
use ledger_model::{
    CellValue, ColumnDefinition, Formatter, PropertyLookup, Record, Row, RowContext,
};
use ledger_table::{ColumnVisibility, summarize};

const TOTAL_LABEL: &str = "TOTAL";

/// Display strings for each visible cell, row-major.
pub fn view_cells(rows: &[&Record], columns: &[&ColumnDefinition]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            let lookup = |key: &str| row.field(key);
            let context = RowContext::new(&lookup);
            columns
                .iter()
                .map(|column| column.display(&row.field(&column.key), &context))
                .collect()
        })
        .collect()
}

/// Totals row: the label in the first column, the formatted sum under every
/// other column holding numbers, `-` elsewhere.
pub fn totals_cells(rows: &[&Record], columns: &[&ColumnDefinition]) -> Vec<String> {
    let no_row = |_: &str| CellValue::Null;
    let context = RowContext::new(&no_row);
    columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            if idx == 0 {
                return TOTAL_LABEL.to_string();
            }
            let summary = summarize(rows.iter().copied(), &column.key, &PropertyLookup);
            if summary.count == 0 {
                "-".to_string()
            } else {
                column.display(&CellValue::Number(summary.sum), &context)
            }
        })
        .collect()
}

/// True when every non-null cell under `key` is a number and at least one is.
pub fn is_numeric_column(rows: &[&Record], key: &str) -> bool {
    let mut seen = false;
    for row in rows {
        match row.field(key) {
            CellValue::Null => {}
            CellValue::Number(_) => seen = true,
            _ => return false,
        }
    }
    seen
}

pub fn view_table(rows: &[&Record], columns: &[&ColumnDefinition], totals: bool) -> Table {
    let mut table = Table::new();
    table.set_header(
        columns
            .iter()
            .map(|column| header_cell(&column.header))
            .collect::<Vec<_>>(),
    );
    apply_table_style(&mut table);
    for (idx, column) in columns.iter().enumerate() {
        if is_numeric_column(rows, &column.key) {
            align_column(&mut table, idx, CellAlignment::Right);
        }
    }
    for row in view_cells(rows, columns) {
        table.add_row(row.into_iter().map(value_cell).collect::<Vec<_>>());
    }
    if totals && !columns.is_empty() {
        let cells = totals_cells(rows, columns)
            .into_iter()
            .enumerate()
            .map(|(idx, text)| {
                if idx == 0 {
                    header_cell(&text)
                } else if text == "-" {
                    dim_cell(text)
                } else {
                    Cell::new(text).add_attribute(Attribute::Bold)
                }
            })
            .collect::<Vec<_>>();
        table.add_row(cells);
    }
    table
}

/// Declared columns with their visibility and capabilities.
pub fn columns_table(columns: &[ColumnDefinition], visibility: &ColumnVisibility) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Key"),
        header_cell("Header"),
        header_cell("Visible"),
        header_cell("Sortable"),
        header_cell("Filterable"),
        header_cell("Format"),
    ]);
    apply_table_style(&mut table);
    for idx in 2..=4 {
        align_column(&mut table, idx, CellAlignment::Center);
    }
    for column in columns {
        table.add_row(vec![
            Cell::new(&column.key)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&column.header),
            flag_cell(visibility.is_visible(&column.key)),
            flag_cell(column.sortable),
            flag_cell(column.filterable),
            match &column.formatter {
                Some(Formatter::Builtin(format)) => Cell::new(format),
                Some(Formatter::Custom(_)) => Cell::new("custom"),
                None => dim_cell("-"),
            },
        ]);
    }
    table
}

pub fn export_table(receipt: &ExportReceipt, output_dir: &Path) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Format"),
        header_cell("Records"),
        header_cell("Bytes"),
        header_cell("Time"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    table.add_row(vec![
        Cell::new(output_dir.join(&receipt.file_name).display()),
        Cell::new(receipt.format),
        Cell::new(receipt.record_count),
        Cell::new(receipt.byte_count),
        Cell::new(format!("{} ms", receipt.elapsed.as_millis())),
    ]);
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn value_cell(text: String) -> Cell {
    if text.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(text)
    }
}

fn flag_cell(enabled: bool) -> Cell {
    if enabled {
        Cell::new("yes").fg(Color::Green)
    } else {
        dim_cell("no")
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use ledger_model::CellFormat;

    use super::*;

    fn record(pairs: &[(&str, CellValue)]) -> Record {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn totals_sum_numeric_columns_through_the_formatter() {
        let rows = [
            record(&[("party", "Acme".into()), ("amount", 1000.0.into())]),
            record(&[("party", "Globex".into()), ("amount", 250.5.into())]),
            record(&[("party", "Initech".into())]),
        ];
        let refs: Vec<&Record> = rows.iter().collect();
        let party = ColumnDefinition::new("party", "Party");
        let amount = ColumnDefinition::new("amount", "Amount").with_formatter(CellFormat::Currency {
            symbol: "$".to_string(),
        });
        let note = ColumnDefinition::new("note", "Note");

        assert_eq!(
            totals_cells(&refs, &[&party, &amount, &note]),
            ["TOTAL", "$1,250.50", "-"]
        );
        assert!(is_numeric_column(&refs, "amount"));
        assert!(!is_numeric_column(&refs, "party"));
        assert!(!is_numeric_column(&refs, "note"));
    }

    #[test]
    fn view_cells_use_display_formatting() {
        let rows = [record(&[("status", "paid".into()), ("qty", 3.0.into())])];
        let refs: Vec<&Record> = rows.iter().collect();
        let status = ColumnDefinition::new("status", "Status").with_formatter(CellFormat::Badge);
        let qty = ColumnDefinition::new("qty", "Qty");
        let missing = ColumnDefinition::new("missing", "Missing");

        assert_eq!(
            view_cells(&refs, &[&status, &qty, &missing]),
            vec![vec!["[paid]".to_string(), "3".to_string(), String::new()]]
        );
    }

    #[test]
    fn rendered_view_has_headers_values_and_totals() {
        let rows = [record(&[("party", "Acme".into()), ("amount", 12.0.into())])];
        let refs: Vec<&Record> = rows.iter().collect();
        let party = ColumnDefinition::new("party", "Party");
        let amount = ColumnDefinition::new("amount", "Amount");

        let rendered = view_table(&refs, &[&party, &amount], true).to_string();
        for expected in ["Party", "Amount", "Acme", "12", "TOTAL"] {
            assert!(rendered.contains(expected), "missing {expected}:\n{rendered}");
        }
    }
}
