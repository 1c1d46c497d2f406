//! Error types for exports.

use ledger_model::ExportFormat;
use thiserror::Error;

use crate::chart::ChartError;

/// Problems caught before an export is handed to the coordinator.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("please enter a filename")]
    EmptyFilename,

    #[error("an export is already in progress")]
    AlreadyExporting,

    #[error("rows are still loading")]
    RowsLoading,
}

/// Underlying reason an export failed. Logged, never shown to the user.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportCause {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chart error: {0}")]
    Chart(#[from] ChartError),

    #[error("could not deliver {file_name}: {source}")]
    Delivery {
        file_name: String,
        #[source]
        source: std::io::Error,
    },
}

/// User-facing export failure.
///
/// Displays as a single generic message; the cause is kept as the error
/// source.
#[derive(Debug, Error)]
#[error("export failed")]
pub struct ExportFailed {
    format: ExportFormat,
    #[source]
    cause: ExportCause,
}

impl ExportFailed {
    pub fn new(format: ExportFormat, cause: impl Into<ExportCause>) -> Self {
        Self {
            format,
            cause: cause.into(),
        }
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn cause(&self) -> &ExportCause {
        &self.cause
    }
}

/// Either side of a session-driven export.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Export(#[from] ExportFailed),
}
