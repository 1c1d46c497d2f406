//! Serializers for each export format.

pub mod csv;
pub mod pdf;
pub mod xlsx;

pub use self::csv::write_csv;
pub use self::pdf::write_pdf;
pub use self::xlsx::write_xlsx;
