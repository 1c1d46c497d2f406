//! Data model for the ledger report engine.
//!
//! Rows are opaque to the engine and read through [`FieldAccess`]. Columns,
//! sort state and export settings are plain values owned by each table.

pub mod column;
pub mod date_range;
pub mod error;
pub mod export;
pub mod row;
pub mod sort;
pub mod value;

pub use column::{
    CellFormat, ColumnDefinition, FormattedValue, Formatter, RowContext, find_column,
};
pub use date_range::{ALL_DATES, DateRange, DateRangePreset, describe_range};
pub use error::{ModelError, Result};
pub use export::{
    ExportCell, ExportData, ExportFormat, ExportMetadata, ExportOptions, effective_include_charts,
};
pub use row::{FieldAccess, KeyedAccessor, PropertyLookup, Record, Row};
pub use sort::{SortDirection, SortSpec};
pub use value::{CellValue, ValueKind, format_number};
