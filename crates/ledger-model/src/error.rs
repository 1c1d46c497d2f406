use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown date range preset: {0}")]
    UnknownPreset(String),
    #[error("unknown export format: {0}")]
    UnknownFormat(String),
    #[error("unknown cell format: {0}")]
    UnknownCellFormat(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid date range: {from} is after {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },
}

pub type Result<T> = std::result::Result<T, ModelError>;
