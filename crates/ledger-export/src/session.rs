//! Caller-side export state.
//!
//! An [`ExportSession`] guards the coordinator the way an export dialog
//! does: it refuses blank filenames, refuses to start while rows are loading
//! or another export runs, and reports whether the dialog's controls should
//! be enabled.

use ledger_model::{ExportFormat, ExportOptions};
use tracing::warn;

use crate::coordinator::ExportReceipt;
use crate::error::{ExportFailed, SessionError, ValidationError};

/// Export lifecycle: `Idle -> Exporting -> Succeeded | Failed -> Idle`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExportPhase {
    #[default]
    Idle,
    Exporting {
        format: ExportFormat,
        file_name: String,
    },
    Succeeded(ExportReceipt),
    Failed {
        format: ExportFormat,
        message: String,
    },
}

impl ExportPhase {
    pub fn is_exporting(&self) -> bool {
        matches!(self, Self::Exporting { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportSession {
    phase: ExportPhase,
}

impl ExportSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &ExportPhase {
        &self.phase
    }

    pub fn is_exporting(&self) -> bool {
        self.phase.is_exporting()
    }

    /// Format select, filename field and export button are disabled while
    /// an export runs.
    pub fn controls_enabled(&self) -> bool {
        !self.is_exporting()
    }

    /// Check that an export may start now.
    pub fn validate(
        &self,
        options: &ExportOptions,
        rows_loading: bool,
    ) -> Result<(), ValidationError> {
        if self.is_exporting() {
            return Err(ValidationError::AlreadyExporting);
        }
        if rows_loading {
            return Err(ValidationError::RowsLoading);
        }
        if options.filename.trim().is_empty() {
            return Err(ValidationError::EmptyFilename);
        }
        Ok(())
    }

    /// Move to `Exporting` after validating.
    pub fn begin(
        &mut self,
        format: ExportFormat,
        options: &ExportOptions,
        rows_loading: bool,
    ) -> Result<(), ValidationError> {
        if let Err(err) = self.validate(options, rows_loading) {
            warn!(error = %err, "export refused");
            return Err(err);
        }
        self.phase = ExportPhase::Exporting {
            format,
            file_name: options.file_name(format),
        };
        Ok(())
    }

    /// Record the outcome of the export started with [`Self::begin`].
    pub fn complete(
        &mut self,
        outcome: Result<ExportReceipt, ExportFailed>,
    ) -> Result<ExportReceipt, ExportFailed> {
        self.phase = match &outcome {
            Ok(receipt) => ExportPhase::Succeeded(receipt.clone()),
            Err(err) => ExportPhase::Failed {
                format: err.format(),
                message: err.to_string(),
            },
        };
        outcome
    }

    /// Return to `Idle` once the outcome has been shown.
    pub fn acknowledge(&mut self) {
        if !self.is_exporting() {
            self.phase = ExportPhase::Idle;
        }
    }

    /// Validate, run `export`, and record its outcome.
    pub fn run<F>(
        &mut self,
        format: ExportFormat,
        options: &ExportOptions,
        rows_loading: bool,
        export: F,
    ) -> Result<ExportReceipt, SessionError>
    where
        F: FnOnce() -> Result<ExportReceipt, ExportFailed>,
    {
        self.begin(format, options, rows_loading)?;
        Ok(self.complete(export())?)
    }
}
