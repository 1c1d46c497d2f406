//! Inclusive date ranges and the quick-pick presets offered by report pages.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};

use crate::error::{ModelError, Result};

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if from > to {
            return Err(ModelError::InvalidDateRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// Parse a pair of `YYYY-MM-DD` strings.
    pub fn parse(from: &str, to: &str) -> Result<Self> {
        Self::new(parse_day(from)?, parse_day(to)?)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    pub fn contains_datetime(&self, value: DateTime<Utc>) -> bool {
        self.contains(value.date_naive())
    }

    pub fn days(&self) -> u64 {
        (self.to - self.from).num_days().unsigned_abs() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.from.format("%Y-%m-%d"),
            self.to.format("%Y-%m-%d")
        )
    }
}

/// Text used when no range applies.
pub const ALL_DATES: &str = "All dates";

/// Display form of an optional range.
pub fn describe_range(range: Option<&DateRange>) -> String {
    range.map_or_else(|| ALL_DATES.to_string(), ToString::to_string)
}

fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ModelError::InvalidDate(value.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangePreset {
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
    ThisMonth,
    LastMonth,
    ThisQuarter,
    ThisYear,
}

impl DateRangePreset {
    pub const ALL: [DateRangePreset; 8] = [
        Self::Today,
        Self::Yesterday,
        Self::Last7Days,
        Self::Last30Days,
        Self::ThisMonth,
        Self::LastMonth,
        Self::ThisQuarter,
        Self::ThisYear,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::Last7Days => "last-7-days",
            Self::Last30Days => "last-30-days",
            Self::ThisMonth => "this-month",
            Self::LastMonth => "last-month",
            Self::ThisQuarter => "this-quarter",
            Self::ThisYear => "this-year",
        }
    }

    /// Resolve the preset relative to `today`.
    pub fn resolve(self, today: NaiveDate) -> DateRange {
        let (from, to) = match self {
            Self::Today => (today, today),
            Self::Yesterday => {
                let day = today.pred_opt().unwrap_or(today);
                (day, day)
            }
            Self::Last7Days => (days_before(today, 6), today),
            Self::Last30Days => (days_before(today, 29), today),
            Self::ThisMonth => {
                let start = month_start(today);
                (start, span_end(start, 1))
            }
            Self::LastMonth => {
                let start = month_start(today)
                    .checked_sub_months(Months::new(1))
                    .unwrap_or(today);
                (start, span_end(start, 1))
            }
            Self::ThisQuarter => {
                let quarter_month = (today.month0() / 3) * 3 + 1;
                let start = NaiveDate::from_ymd_opt(today.year(), quarter_month, 1)
                    .unwrap_or(today);
                (start, span_end(start, 3))
            }
            Self::ThisYear => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                (start, span_end(start, 12))
            }
        };
        DateRange { from, to }
    }
}

impl fmt::Display for DateRangePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateRangePreset {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str() == normalized)
            .ok_or_else(|| ModelError::UnknownPreset(s.to_string()))
    }
}

fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days)).unwrap_or(date)
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of a span of `months` starting at `start`.
fn span_end(start: NaiveDate, months: u32) -> NaiveDate {
    start
        .checked_add_months(Months::new(months))
        .and_then(|next| next.pred_opt())
        .unwrap_or(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rolling_windows_include_today() {
        let today = day(2024, 3, 5);
        let week = DateRangePreset::Last7Days.resolve(today);
        assert_eq!(week.from, day(2024, 2, 28));
        assert_eq!(week.to, today);
        assert_eq!(week.days(), 7);
        assert_eq!(DateRangePreset::Last30Days.resolve(today).days(), 30);
    }

    #[test]
    fn calendar_presets_cover_whole_periods() {
        let today = day(2024, 2, 14);
        assert_eq!(
            DateRangePreset::ThisMonth.resolve(today),
            DateRange {
                from: day(2024, 2, 1),
                to: day(2024, 2, 29)
            }
        );
        assert_eq!(
            DateRangePreset::ThisQuarter.resolve(today),
            DateRange {
                from: day(2024, 1, 1),
                to: day(2024, 3, 31)
            }
        );
        assert_eq!(
            DateRangePreset::ThisYear.resolve(today),
            DateRange {
                from: day(2024, 1, 1),
                to: day(2024, 12, 31)
            }
        );
    }

    #[test]
    fn last_month_crosses_year_boundary() {
        let range = DateRangePreset::LastMonth.resolve(day(2025, 1, 10));
        assert_eq!(range.from, day(2024, 12, 1));
        assert_eq!(range.to, day(2024, 12, 31));
        let yesterday = DateRangePreset::Yesterday.resolve(day(2025, 1, 1));
        assert_eq!(yesterday.from, day(2024, 12, 31));
    }

    #[test]
    fn parses_presets_and_ranges() {
        assert_eq!(
            "last_30_days".parse::<DateRangePreset>(),
            Ok(DateRangePreset::Last30Days)
        );
        assert!("fortnight".parse::<DateRangePreset>().is_err());
        assert!(DateRange::parse("2024-02-01", "2024-01-01").is_err());
        assert!(DateRange::parse("2024-13-01", "2024-12-01").is_err());
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        assert_eq!(range.to_string(), "2024-01-01 to 2024-01-31");
        assert_eq!(describe_range(None), "All dates");
    }
}
