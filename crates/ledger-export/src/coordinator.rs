//! Export dispatch.
//!
//! Serializes the current view in the requested format and hands the bytes
//! to a [`DownloadSink`] under `{filename}.{ext}`. Filename validation
//! happens upstream in [`crate::ExportSession`].

use std::time::{Duration, Instant};

use ledger_model::{ColumnDefinition, ExportData, ExportFormat, ExportOptions, FieldAccess};
use tracing::{error, info, info_span};

use crate::data::build_export_data;
use crate::error::{ExportCause, ExportFailed};
use crate::metadata::generate_metadata;
use crate::request::ExportRequest;
use crate::sink::DownloadSink;
use crate::writers::{write_csv, write_pdf, write_xlsx};

/// Outcome of a delivered export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub file_name: String,
    pub format: ExportFormat,
    pub record_count: usize,
    pub byte_count: usize,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct ExportCoordinator<S> {
    sink: S,
}

impl<S: DownloadSink> ExportCoordinator<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Export `rows` under the visible `columns`.
    ///
    /// Excel and PDF exports get metadata generated from the row count and
    /// the options' date range.
    pub fn export<R, A>(
        &mut self,
        rows: &[&R],
        columns: &[&ColumnDefinition],
        options: &ExportOptions,
        request: ExportRequest<'_>,
        accessor: &A,
    ) -> Result<ExportReceipt, ExportFailed>
    where
        A: FieldAccess<R> + ?Sized,
    {
        let mut data = build_export_data(rows, columns, accessor);
        if request.format() != ExportFormat::Csv {
            let metadata = generate_metadata(data.record_count(), options.date_range.as_ref());
            data = data.with_metadata(metadata);
        }
        self.export_data(&data, options, request)
    }

    /// Export already-flattened data; metadata is used as given.
    pub fn export_data(
        &mut self,
        data: &ExportData,
        options: &ExportOptions,
        request: ExportRequest<'_>,
    ) -> Result<ExportReceipt, ExportFailed> {
        let format = request.format();
        let file_name = options.file_name(format);
        let span = info_span!("export", format = %format, file = %file_name);
        let _guard = span.enter();
        let started = Instant::now();
        info!(
            record_count = data.record_count(),
            chart = request.has_chart(),
            "export started"
        );

        let delivered = render(data, &options.title, request).and_then(|bytes| {
            self.sink
                .deliver(&file_name, &bytes)
                .map_err(|source| ExportCause::Delivery {
                    file_name: file_name.clone(),
                    source,
                })?;
            Ok(bytes.len())
        });

        match delivered {
            Ok(byte_count) => {
                let elapsed = started.elapsed();
                info!(
                    byte_count,
                    duration_ms = elapsed.as_millis(),
                    "export complete"
                );
                Ok(ExportReceipt {
                    file_name,
                    format,
                    record_count: data.record_count(),
                    byte_count,
                    elapsed,
                })
            }
            Err(cause) => {
                error!(error = %cause, "export failed");
                Err(ExportFailed::new(format, cause))
            }
        }
    }
}

fn render(
    data: &ExportData,
    title: &str,
    request: ExportRequest<'_>,
) -> Result<Vec<u8>, ExportCause> {
    match request {
        ExportRequest::Csv => write_csv(data),
        ExportRequest::Excel => write_xlsx(data, title),
        ExportRequest::Pdf { chart } => {
            let image = chart.map(|source| source.rasterize()).transpose()?;
            write_pdf(data, title, image.as_ref())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use ledger_model::{CellValue, PropertyLookup, Record};

    use super::*;
    use crate::chart::{ChartError, ChartSource, RasterImage};
    use crate::sink::MemorySink;

    struct FailingSink;

    impl DownloadSink for FailingSink {
        fn deliver(&mut self, _: &str, _: &[u8]) -> io::Result<()> {
            Err(io::Error::other("browser blocked the download"))
        }
    }

    struct MissingChart;

    impl ChartSource for MissingChart {
        fn rasterize(&self) -> Result<RasterImage, ChartError> {
            Err(ChartError::Unavailable("chart not mounted".to_string()))
        }
    }

    fn rows() -> Vec<Record> {
        ["Acme", "Globex"]
            .into_iter()
            .map(|party| {
                let mut record = Record::new();
                record.insert("party".to_string(), CellValue::text(party));
                record
            })
            .collect()
    }

    #[test]
    fn delivers_file_named_after_options() {
        let rows = rows();
        let refs: Vec<&Record> = rows.iter().collect();
        let column = ColumnDefinition::new("party", "Party");
        let options = ExportOptions::new("  parties ", "Parties");
        let mut coordinator = ExportCoordinator::new(MemorySink::new());

        let receipt = coordinator
            .export(&refs, &[&column], &options, ExportRequest::Excel, &PropertyLookup)
            .unwrap();

        assert_eq!(receipt.file_name, "parties.xlsx");
        assert_eq!(receipt.record_count, 2);
        let bytes = coordinator.sink().get("parties.xlsx").unwrap();
        assert_eq!(bytes.len(), receipt.byte_count);
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn metadata_sheet_only_for_non_csv_exports() {
        let rows = rows();
        let refs: Vec<&Record> = rows.iter().collect();
        let column = ColumnDefinition::new("party", "Party");
        let options = ExportOptions::new("parties", "Parties");
        let mut coordinator = ExportCoordinator::new(MemorySink::new());

        for format in [ExportFormat::Csv, ExportFormat::Excel] {
            let request = ExportRequest::new(format, &options, None);
            coordinator
                .export(&refs, &[&column], &options, request, &PropertyLookup)
                .unwrap();
        }

        let csv = coordinator.sink().get("parties.csv").unwrap();
        assert_eq!(csv, b"Party\nAcme\nGlobex\n");
        let xlsx = coordinator.sink().get("parties.xlsx").unwrap();
        let archive = zip::ZipArchive::new(io::Cursor::new(xlsx)).unwrap();
        assert!(archive.index_for_name("xl/worksheets/sheet2.xml").is_some());
    }

    #[test]
    fn delivery_errors_become_export_failed() {
        let options = ExportOptions::new("report", "Report");
        let mut coordinator = ExportCoordinator::new(FailingSink);
        let err = coordinator
            .export_data(&ExportData::default(), &options, ExportRequest::Csv)
            .unwrap_err();
        assert_eq!(err.to_string(), "export failed");
        assert_eq!(err.format(), ExportFormat::Csv);
        assert!(matches!(err.cause(), ExportCause::Delivery { file_name, .. } if file_name == "report.csv"));
    }

    #[test]
    fn chart_failures_abort_pdf_export() {
        let options = ExportOptions::new("report", "Report").with_include_charts(true);
        let chart = MissingChart;
        let request = ExportRequest::new(ExportFormat::Pdf, &options, Some(&chart));
        let mut coordinator = ExportCoordinator::new(MemorySink::new());
        let err = coordinator
            .export_data(&ExportData::default(), &options, request)
            .unwrap_err();
        assert!(matches!(err.cause(), ExportCause::Chart(_)));
        assert!(coordinator.sink().is_empty());
    }
}
