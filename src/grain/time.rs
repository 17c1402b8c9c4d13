//! Time-grain bucket labels.
//!
//! Labels sort lexically in chronological order within one granularity:
//! `2024-01-05`, `2024-W01`, `2024-01`, `2024-Q1`, `2024`. Weeks are ISO 8601
//! weeks (Monday start, ISO week-numbering year), so the last days of
//! December can land in week 1 of the next year.

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;

use crate::error::{ReportError, ReportResult};

/// Time-bucket granularity selector.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGrain {
    #[default]
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl TimeGrain {
    pub const ALL: [TimeGrain; 5] = [
        TimeGrain::Day,
        TimeGrain::Week,
        TimeGrain::Month,
        TimeGrain::Quarter,
        TimeGrain::Year,
    ];

    /// Map a parameter-source code to a granularity.
    pub fn from_code(code: i64) -> ReportResult<Self> {
        match code {
            1 => Ok(Self::Day),
            2 => Ok(Self::Week),
            3 => Ok(Self::Month),
            4 => Ok(Self::Quarter),
            5 => Ok(Self::Year),
            other => Err(ReportError::Config(format!(
                "unrecognized time grain code {other}"
            ))),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Day => 1,
            Self::Week => 2,
            Self::Month => 3,
            Self::Quarter => 4,
            Self::Year => 5,
        }
    }

    /// Bucket label for `value` at this granularity.
    pub fn label(self, value: NaiveDateTime) -> String {
        time_grain(self, value)
    }
}

impl std::fmt::Display for TimeGrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
            Self::Quarter => write!(f, "quarter"),
            Self::Year => write!(f, "year"),
        }
    }
}

/// Classify `value` into its bucket label for `grain`.
pub fn time_grain(grain: TimeGrain, value: NaiveDateTime) -> String {
    let date = value.date();
    match grain {
        TimeGrain::Day => date.format("%Y-%m-%d").to_string(),
        TimeGrain::Week => {
            let iso = date.iso_week();
            format!("{}-W{:02}", iso.year(), iso.week())
        }
        TimeGrain::Month => date.format("%Y-%m").to_string(),
        TimeGrain::Quarter => format!("{}-Q{}", date.year(), date.month0() / 3 + 1),
        TimeGrain::Year => format!("{}", date.year()),
    }
}

/// Classify using a raw granularity code; unknown codes are a config error.
pub fn time_grain_for_code(code: i64, value: NaiveDateTime) -> ReportResult<String> {
    Ok(time_grain(TimeGrain::from_code(code)?, value))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
