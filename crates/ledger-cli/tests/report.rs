//! Integration tests for loading, viewing and exporting reports.

use std::path::{Path, PathBuf};

use ledger_cli::report::{ExportSettings, Report, ViewOptions};
use ledger_cli::summary::{totals_cells, view_cells};
use ledger_export::{DirectorySink, ExportCoordinator};
use ledger_model::{DateRange, ExportFormat};
use lopdf::{Document, Object};
use tempfile::TempDir;

const ROWS: &str = r#"[
  {"date": "2024-03-02", "party": "Acme", "amount": "1,200", "status": "paid"},
  {"date": "2024-01-15", "party": "globex", "amount": 300, "status": "due"},
  {"date": "2024-02-10", "party": "Initech", "amount": null, "status": "due"}
]"#;

const CONFIG: &str = r#"
title = "Receivables"
filename = "receivables"

[[columns]]
key = "date"
header = "Date"
kind = "date"
format = "date"

[[columns]]
key = "party"
header = "Party"

[[columns]]
key = "amount"
header = "Amount"
kind = "number"
format = "currency:$"

[[columns]]
key = "status"
header = "Status"
format = "badge"
sortable = false
filterable = false
"#;

struct Fixture {
    dir: TempDir,
    data: PathBuf,
    config: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("rows.json");
        let config = dir.path().join("report.toml");
        std::fs::write(&data, ROWS).unwrap();
        std::fs::write(&config, CONFIG).unwrap();
        Self { dir, data, config }
    }

    fn options(&self) -> ViewOptions {
        ViewOptions {
            config: Some(self.config.clone()),
            ..ViewOptions::default()
        }
    }

    fn prepare(&self, options: &ViewOptions) -> Report {
        Report::prepare(&self.data, options).unwrap()
    }

    fn out(&self) -> &Path {
        self.dir.path()
    }
}

fn column(report: &Report, key: &str) -> Vec<String> {
    let (rows, _) = report.view();
    rows.iter().map(|row| row[key].to_string()).collect()
}

#[test]
fn formatted_view_sorted_descending_keeps_nulls_last() {
    let fixture = Fixture::new();
    let options = ViewOptions {
        sort: Some("amount:desc".to_string()),
        ..fixture.options()
    };
    let report = fixture.prepare(&options);
    let (rows, columns) = report.view();

    insta::assert_json_snapshot!(view_cells(&rows, &columns), @r#"
    [
      [
        "02 Mar 2024",
        "Acme",
        "$1,200.00",
        "[paid]"
      ],
      [
        "15 Jan 2024",
        "globex",
        "$300.00",
        "[due]"
      ],
      [
        "10 Feb 2024",
        "Initech",
        "",
        "[due]"
      ]
    ]
    "#);
    assert_eq!(
        totals_cells(&rows, &columns),
        ["TOTAL", "-", "$1,500.00", "-"].map(String::from)
    );
}

#[test]
fn text_sort_ignores_case() {
    let fixture = Fixture::new();
    let options = ViewOptions {
        sort: Some("party".to_string()),
        ..fixture.options()
    };
    let report = fixture.prepare(&options);
    assert_eq!(column(&report, "party"), ["Acme", "globex", "Initech"]);
}

#[test]
fn date_column_restricts_rows_to_range() {
    let fixture = Fixture::new();
    let options = ViewOptions {
        date_range: Some(DateRange::parse("2024-02-01", "2024-03-31").unwrap()),
        date_column: Some("date".to_string()),
        ..fixture.options()
    };
    let report = fixture.prepare(&options);
    assert_eq!(column(&report, "party"), ["Acme", "Initech"]);
    assert_eq!(report.total_rows(), 3);
}

#[test]
fn filters_on_non_filterable_columns_are_ignored() {
    let fixture = Fixture::new();
    let options = ViewOptions {
        filters: vec!["status=paid".to_string()],
        ..fixture.options()
    };
    assert_eq!(fixture.prepare(&options).view().0.len(), 3);

    let options = ViewOptions {
        filters: vec!["party~GLOB".to_string()],
        ..fixture.options()
    };
    assert_eq!(column(&fixture.prepare(&options), "party"), ["globex"]);
}

#[test]
fn unknown_hides_and_unsortable_columns_are_errors() {
    let fixture = Fixture::new();
    let hide = ViewOptions {
        hide: vec!["gstin".to_string()],
        ..fixture.options()
    };
    let err = Report::prepare(&fixture.data, &hide).unwrap_err();
    assert_eq!(err.to_string(), "cannot hide unknown column gstin");

    let sort = ViewOptions {
        sort: Some("status".to_string()),
        ..fixture.options()
    };
    let err = Report::prepare(&fixture.data, &sort).unwrap_err();
    assert!(err.to_string().contains("not sortable"));
}

#[test]
fn csv_export_contains_only_visible_filtered_rows() {
    let fixture = Fixture::new();
    let options = ViewOptions {
        hide: vec!["status".to_string()],
        filters: vec!["amount>=500".to_string()],
        ..fixture.options()
    };
    let report = fixture.prepare(&options);
    let mut coordinator = ExportCoordinator::new(DirectorySink::new(fixture.out()));
    let receipt = report
        .export(&ExportSettings::new(ExportFormat::Csv), &mut coordinator)
        .unwrap();

    assert_eq!(receipt.file_name, "receivables.csv");
    assert_eq!(receipt.record_count, 1);
    let written = std::fs::read_to_string(fixture.out().join("receivables.csv")).unwrap();
    insta::assert_snapshot!(written, @r#"
    Date,Party,Amount
    02 Mar 2024,Acme,"$1,200.00"
    "#);
}

fn chart_png(path: &Path) {
    let chart = image::RgbImage::from_pixel(4, 3, image::Rgb([0, 90, 200]));
    chart.save(path).unwrap();
}

#[test]
fn pdf_export_embeds_png_chart() {
    let fixture = Fixture::new();
    let chart = fixture.out().join("chart.png");
    chart_png(&chart);

    let report = fixture.prepare(&fixture.options());
    let settings = ExportSettings {
        filename: Some("q1".to_string()),
        title: Some("Q1 Receivables".to_string()),
        include_charts: true,
        chart: Some(chart),
        ..ExportSettings::new(ExportFormat::Pdf)
    };
    let mut coordinator = ExportCoordinator::new(DirectorySink::new(fixture.out()));
    let receipt = report.export(&settings, &mut coordinator).unwrap();

    assert_eq!(receipt.file_name, "q1.pdf");
    let doc = Document::load(fixture.out().join("q1.pdf")).unwrap();
    let info = doc.trailer.get(b"Info").and_then(Object::as_reference).unwrap();
    let title = doc.get_dictionary(info).unwrap().get(b"Title").unwrap();
    assert_eq!(title.as_str().unwrap(), b"Q1 Receivables");

    let image = doc
        .objects
        .values()
        .filter_map(|object| object.as_stream().ok())
        .find(|stream| {
            stream.dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"Image".as_slice())
        })
        .unwrap();
    assert_eq!(image.dict.get(b"Width").and_then(Object::as_i64).unwrap(), 4);
    assert_eq!(image.dict.get(b"Height").and_then(Object::as_i64).unwrap(), 3);
}

#[test]
fn unreadable_chart_fails_before_export() {
    let fixture = Fixture::new();
    let chart = fixture.out().join("chart.png");
    std::fs::write(&chart, b"not a picture").unwrap();

    let report = fixture.prepare(&fixture.options());
    let settings = ExportSettings {
        include_charts: true,
        chart: Some(chart),
        ..ExportSettings::new(ExportFormat::Pdf)
    };
    let mut coordinator = ExportCoordinator::new(DirectorySink::new(fixture.out()));
    let err = report.export(&settings, &mut coordinator).unwrap_err();
    assert!(format!("{err:#}").contains("could not decode chart image"));
    assert!(!fixture.out().join("receivables.pdf").exists());
}

#[test]
fn blank_filename_is_refused() {
    let fixture = Fixture::new();
    let report = fixture.prepare(&fixture.options());
    let settings = ExportSettings {
        filename: Some("   ".to_string()),
        ..ExportSettings::new(ExportFormat::Excel)
    };
    let mut coordinator = ExportCoordinator::new(DirectorySink::new(fixture.out()));
    let err = report.export(&settings, &mut coordinator).unwrap_err();
    assert_eq!(err.to_string(), "please enter a filename");
    assert!(!fixture.out().join("   .xlsx").exists());
}

#[test]
fn csv_rows_without_config_become_text_columns() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("day-book.csv");
    std::fs::write(&data, "voucher,party\nV-2,Bob\nV-1,ann\n").unwrap();
    let options = ViewOptions {
        search: "BO".to_string(),
        ..ViewOptions::default()
    };
    let report = Report::prepare(&data, &options).unwrap();
    let (rows, columns) = report.view();

    assert_eq!(report.config().title, "Report");
    assert_eq!(
        columns.iter().map(|c| c.key.as_str()).collect::<Vec<_>>(),
        ["voucher", "party"]
    );
    assert_eq!(view_cells(&rows, &columns), vec![vec!["V-2", "Bob"]]);
}
