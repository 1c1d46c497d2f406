//! A loaded report: rows, column configuration and the table state built
//! from command-line choices.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use ledger_export::{
    ChartSource, DownloadSink, ExportCoordinator, ExportReceipt, ExportRequest, ExportSession,
    RasterImage,
};
use ledger_model::{
    ColumnDefinition, DateRange, DateRangePreset, ExportFormat, ExportOptions, PropertyLookup,
    Record, SortDirection, find_column,
};
use ledger_table::{ColumnFilter, FilterPredicate, TableState};
use tracing::{debug, info, warn};

use crate::config::ReportConfig;
use crate::filters::{parse_filter, parse_sort};
use crate::loader::load_rows;

/// Environment variable consulted when no output directory is given.
pub const OUTPUT_DIR_ENV: &str = "LEDGER_EXPORT_DIR";

const DEFAULT_TITLE: &str = "Report";
const DEFAULT_FILENAME: &str = "report";

/// View choices shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    pub config: Option<PathBuf>,
    pub search: String,
    pub sort: Option<String>,
    pub hide: Vec<String>,
    pub filters: Vec<String>,
    pub date_range: Option<DateRange>,
    /// Column restricted to `date_range`.
    pub date_column: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub format: ExportFormat,
    pub filename: Option<String>,
    pub title: Option<String>,
    pub include_charts: bool,
    pub chart: Option<PathBuf>,
}

impl ExportSettings {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            filename: None,
            title: None,
            include_charts: false,
            chart: None,
        }
    }
}

#[derive(Debug)]
pub struct Report {
    config: ReportConfig,
    table: TableState,
    rows: Vec<Record>,
    date_range: Option<DateRange>,
}

impl Report {
    /// Load `data` and apply `options` to a fresh table.
    pub fn prepare(data: &Path, options: &ViewOptions) -> Result<Self> {
        let config = options
            .config
            .as_deref()
            .map(ReportConfig::load)
            .transpose()?;
        let kinds = config.as_ref().map(ReportConfig::kinds).unwrap_or_default();
        let loaded = load_rows(data, &kinds)?;
        let config = match config {
            Some(config) => config,
            None => ReportConfig::inferred(DEFAULT_TITLE, loaded.keys.iter().cloned()),
        };
        let mut table = TableState::new(config.column_definitions()?);

        table.set_search(options.search.clone());
        if let Some(expr) = &options.sort {
            apply_sort(&mut table, expr)?;
        }
        for key in &options.hide {
            if find_column(table.columns(), key).is_none() {
                bail!("cannot hide unknown column {key}");
            }
            if table.visibility().is_visible(key) {
                table.toggle_column(key);
            }
        }
        for expr in &options.filters {
            let filter = parse_filter(expr)?;
            warn_if_ignored(table.columns(), &filter);
            table.add_filter(filter);
        }
        match (&options.date_column, options.date_range) {
            (Some(column), Some(range)) => {
                let filter = ColumnFilter::new(column.clone(), FilterPredicate::DateBetween(range));
                warn_if_ignored(table.columns(), &filter);
                table.add_filter(filter);
            }
            (Some(column), None) => {
                warn!(column = %column, "date column given without a date range; ignoring");
            }
            (None, _) => {}
        }

        Ok(Self {
            config,
            table,
            rows: loaded.rows,
            date_range: options.date_range,
        })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn table(&self) -> &TableState {
        &self.table
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn date_range(&self) -> Option<&DateRange> {
        self.date_range.as_ref()
    }

    /// Rows and columns as currently displayed.
    pub fn view(&self) -> (Vec<&Record>, Vec<&ColumnDefinition>) {
        (
            self.table.visible_rows(&self.rows),
            self.table.visible_columns(),
        )
    }

    /// Export options for `settings`, filling gaps from the config.
    pub fn export_options(&self, settings: &ExportSettings) -> ExportOptions {
        let filename = settings
            .filename
            .clone()
            .or_else(|| self.config.filename.clone())
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        let title = settings
            .title
            .clone()
            .unwrap_or_else(|| self.config.title.clone());
        ExportOptions::new(filename, title)
            .with_include_charts(settings.include_charts)
            .with_date_range(self.date_range)
    }

    /// Export the current view through `coordinator`.
    pub fn export<S: DownloadSink>(
        &self,
        settings: &ExportSettings,
        coordinator: &mut ExportCoordinator<S>,
    ) -> Result<ExportReceipt> {
        let options = self.export_options(settings);
        let chart = settings.chart.as_deref().map(load_chart).transpose()?;
        if options.include_charts && chart.is_none() {
            warn!("charts requested but no chart raster given");
        }
        let request = ExportRequest::new(
            settings.format,
            &options,
            chart.as_ref().map(|image| image as &dyn ChartSource),
        );
        let (rows, columns) = self.view();
        let mut session = ExportSession::new();
        let receipt = session.run(settings.format, &options, self.table.is_loading(), || {
            coordinator.export(&rows, &columns, &options, request, &PropertyLookup)
        })?;
        info!(file = %receipt.file_name, records = receipt.record_count, "report exported");
        Ok(receipt)
    }
}

fn apply_sort(table: &mut TableState, expr: &str) -> Result<()> {
    let spec = parse_sort(expr)?;
    let Some((key, direction)) = spec.active() else {
        return Ok(());
    };
    let clicks = match direction {
        SortDirection::Asc => 1,
        SortDirection::Desc => 2,
    };
    for _ in 0..clicks {
        if !table.click_header(key) {
            bail!("cannot sort by {key}: unknown or not sortable column");
        }
    }
    debug!(sort = %expr, "sort applied");
    Ok(())
}

fn warn_if_ignored(columns: &[ColumnDefinition], filter: &ColumnFilter) {
    match find_column(columns, &filter.key) {
        Some(column) if column.filterable => {}
        Some(_) => warn!(filter = %filter, "column is not filterable; filter ignored"),
        None => warn!(filter = %filter, "unknown column; filter ignored"),
    }
}

fn load_chart(path: &Path) -> Result<RasterImage> {
    let bytes = std::fs::read(path).with_context(|| format!("read chart {}", path.display()))?;
    RasterImage::decode(&bytes).with_context(|| format!("decode chart {}", path.display()))
}

/// Resolve a preset name or an explicit `from`/`to` pair.
pub fn resolve_date_range(
    preset: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> Result<Option<DateRange>> {
    match (preset, from, to) {
        (Some(preset), None, None) => {
            let preset: DateRangePreset = preset.parse()?;
            Ok(Some(preset.resolve(today)))
        }
        (None, Some(from), Some(to)) => Ok(Some(DateRange::parse(from, to)?)),
        (None, None, None) => Ok(None),
        _ => bail!("use either --date-range or both --from and --to"),
    }
}

/// `flag`, then the `LEDGER_EXPORT_DIR` value, then the current directory.
pub fn resolve_output_dir(flag: Option<PathBuf>, env: Option<OsString>) -> PathBuf {
    flag.or_else(|| env.filter(|value| !value.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}
