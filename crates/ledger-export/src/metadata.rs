use chrono::{DateTime, Utc};
use ledger_model::{DateRange, ExportMetadata, describe_range};

/// Metadata for an export generated now.
pub fn generate_metadata(record_count: usize, date_range: Option<&DateRange>) -> ExportMetadata {
    generate_metadata_at(record_count, date_range, Utc::now())
}

pub fn generate_metadata_at(
    record_count: usize,
    date_range: Option<&DateRange>,
    generated_at: DateTime<Utc>,
) -> ExportMetadata {
    ExportMetadata {
        record_count,
        date_range: describe_range(date_range),
        generated_at,
    }
}
