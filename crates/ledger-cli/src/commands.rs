use std::time::Instant;

use anyhow::Result;
use chrono::Local;
use ledger_cli::report::{
    ExportSettings, OUTPUT_DIR_ENV, Report, ViewOptions, resolve_date_range, resolve_output_dir,
};
use ledger_cli::summary::{columns_table, export_table, view_table};
use ledger_export::{DirectorySink, ExportCoordinator};
use tracing::{info, info_span};

use crate::cli::{ExportArgs, ViewArgs};

pub fn run_view(args: &ViewArgs) -> Result<()> {
    let span = info_span!("view", data = %args.data.display());
    let _guard = span.enter();
    let start = Instant::now();

    let report = Report::prepare(&args.data, &view_options(args)?)?;
    let (rows, columns) = report.view();
    println!("{}", report.config().title);
    if let Some(range) = report.date_range() {
        println!("Date range: {range}");
    }
    if columns.is_empty() {
        println!("No columns selected.");
    } else {
        println!("{}", view_table(&rows, &columns, args.totals));
    }
    println!("Showing {} of {} rows", rows.len(), report.total_rows());
    info!(
        shown = rows.len(),
        total = report.total_rows(),
        duration_ms = start.elapsed().as_millis(),
        "view complete"
    );
    Ok(())
}

pub fn run_columns(args: &ViewArgs) -> Result<()> {
    let report = Report::prepare(&args.data, &view_options(args)?)?;
    let table = report.table();
    println!("{}", columns_table(table.columns(), table.visibility()));
    Ok(())
}

pub fn run_export(args: &ExportArgs) -> Result<()> {
    let span = info_span!("export_command", data = %args.view.data.display());
    let _guard = span.enter();

    let report = Report::prepare(&args.view.data, &view_options(&args.view)?)?;
    let output_dir = resolve_output_dir(
        args.output_dir.clone(),
        std::env::var_os(OUTPUT_DIR_ENV),
    );
    let settings = ExportSettings {
        format: args.format.into(),
        filename: args.filename.clone(),
        title: args.title.clone(),
        include_charts: args.include_charts,
        chart: args.chart.clone(),
    };
    let mut coordinator = ExportCoordinator::new(DirectorySink::new(&output_dir));
    let receipt = report.export(&settings, &mut coordinator)?;
    println!("{}", export_table(&receipt, &output_dir));
    Ok(())
}

fn view_options(args: &ViewArgs) -> Result<ViewOptions> {
    let date_range = resolve_date_range(
        args.date_range.as_deref(),
        args.from.as_deref(),
        args.to.as_deref(),
        Local::now().date_naive(),
    )?;
    Ok(ViewOptions {
        config: args.config.clone(),
        search: args.search.clone(),
        sort: args.sort.clone(),
        hide: args.hide.clone(),
        filters: args.filter.clone(),
        date_range,
        date_column: args.date_column.clone(),
    })
}
