//! Export of ledger report views.
//!
//! [`ExportCoordinator`] turns the filtered, sorted and projected view into
//! CSV, XLSX or PDF bytes and delivers them through a [`DownloadSink`].
//! [`ExportSession`] holds the per-dialog state that gates it.

pub mod chart;
pub mod coordinator;
pub mod data;
pub mod error;
pub mod metadata;
pub mod request;
pub mod session;
pub mod sink;
pub mod writers;

pub use chart::{ChartError, ChartSource, RasterImage};
pub use coordinator::{ExportCoordinator, ExportReceipt};
pub use data::{build_export_data, export_cell};
pub use error::{ExportCause, ExportFailed, SessionError, ValidationError};
pub use metadata::{generate_metadata, generate_metadata_at};
pub use request::ExportRequest;
pub use session::{ExportPhase, ExportSession};
pub use sink::{DirectorySink, DownloadSink, MemorySink};
pub use writers::{write_csv, write_pdf, write_xlsx};
