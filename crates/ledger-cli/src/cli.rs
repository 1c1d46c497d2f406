//! CLI argument definitions for `ledger-report`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use ledger_model::ExportFormat;

#[derive(Parser)]
#[command(
    name = "ledger-report",
    version,
    about = "Search, sort and export tabular ledger reports",
    long_about = "Load report rows from JSON or CSV, apply search, column filters, sorting\n\
                  and column visibility, then print the view or export it as CSV,\n\
                  an Excel workbook or a PDF document."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the filtered, sorted view as a table.
    View(ViewArgs),

    /// Export the current view to a file.
    Export(ExportArgs),

    /// List the declared columns and their visibility.
    Columns(ViewArgs),
}

#[derive(Args)]
pub struct ViewArgs {
    /// Rows to load (.json array of objects or .csv with headers).
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    /// Report configuration (TOML). Without it every field becomes a text column.
    #[arg(long = "config", short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Case-insensitive search across every field of a row.
    #[arg(long = "search", short = 's', value_name = "TERM", default_value = "")]
    pub search: String,

    /// Sort column, optionally with a direction (`amount:desc`).
    #[arg(long = "sort", value_name = "KEY[:asc|desc]")]
    pub sort: Option<String>,

    /// Hide a column (repeatable).
    #[arg(long = "hide", value_name = "KEY")]
    pub hide: Vec<String>,

    /// Column filter such as `amount>=100` or `party~acme` (repeatable).
    #[arg(long = "filter", short = 'f', value_name = "EXPR")]
    pub filter: Vec<String>,

    /// Date range preset (today, last-7-days, this-month, ...).
    #[arg(long = "date-range", value_name = "PRESET", conflicts_with_all = ["from", "to"])]
    pub date_range: Option<String>,

    /// Start of a custom date range (YYYY-MM-DD).
    #[arg(long = "from", value_name = "DATE", requires = "to")]
    pub from: Option<String>,

    /// End of a custom date range (YYYY-MM-DD).
    #[arg(long = "to", value_name = "DATE", requires = "from")]
    pub to: Option<String>,

    /// Column the date range restricts. Without it the range only labels exports.
    #[arg(long = "date-column", value_name = "KEY")]
    pub date_column: Option<String>,

    /// Append a totals row for numeric columns.
    #[arg(long = "totals")]
    pub totals: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "csv")]
    pub format: FormatArg,

    /// File name without extension (default: config filename, then "report").
    #[arg(long = "filename", short = 'o', value_name = "NAME")]
    pub filename: Option<String>,

    /// Document title (default: config title).
    #[arg(long = "title", value_name = "TITLE")]
    pub title: Option<String>,

    /// Embed the chart in PDF exports.
    #[arg(long = "include-charts")]
    pub include_charts: bool,

    /// Rasterized chart to embed (PNG, JPEG or PPM).
    #[arg(long = "chart", value_name = "PATH")]
    pub chart: Option<PathBuf>,

    /// Directory to write into (default: $LEDGER_EXPORT_DIR, then the current directory).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Csv,
    #[value(alias = "xlsx")]
    Excel,
    Pdf,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => Self::Csv,
            FormatArg::Excel => Self::Excel,
            FormatArg::Pdf => Self::Pdf,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
