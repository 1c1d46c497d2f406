use std::fmt;

use ledger_model::{ExportFormat, ExportOptions, effective_include_charts};

use crate::chart::ChartSource;

/// What to produce. A chart can only ride along on a PDF request.
#[derive(Clone, Copy)]
pub enum ExportRequest<'a> {
    Csv,
    Excel,
    Pdf { chart: Option<&'a dyn ChartSource> },
}

impl<'a> ExportRequest<'a> {
    /// Request for `format`, keeping `chart` only when the options ask for
    /// charts and the format can carry one.
    pub fn new(
        format: ExportFormat,
        options: &ExportOptions,
        chart: Option<&'a dyn ChartSource>,
    ) -> Self {
        match format {
            ExportFormat::Csv => Self::Csv,
            ExportFormat::Excel => Self::Excel,
            ExportFormat::Pdf => Self::Pdf {
                chart: chart.filter(|_| effective_include_charts(format, options.include_charts)),
            },
        }
    }

    pub fn format(&self) -> ExportFormat {
        match self {
            Self::Csv => ExportFormat::Csv,
            Self::Excel => ExportFormat::Excel,
            Self::Pdf { .. } => ExportFormat::Pdf,
        }
    }

    pub fn has_chart(&self) -> bool {
        matches!(self, Self::Pdf { chart: Some(_) })
    }
}

impl fmt::Debug for ExportRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => f.write_str("Csv"),
            Self::Excel => f.write_str("Excel"),
            Self::Pdf { .. } => f
                .debug_struct("Pdf")
                .field("chart", &self.has_chart())
                .finish(),
        }
    }
}
