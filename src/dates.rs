//! Date normalization: raw source date text → calendar value.
//!
//! Time-grain classification only ever sees [`NaiveDateTime`]; turning the
//! database's text representation into that value happens here, before the
//! core is involved.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{ReportError, ReportResult};

/// Converts the source's native date representation into a calendar value.
pub trait DateNormalizer {
    fn normalize(&self, raw: &str) -> ReportResult<NaiveDateTime>;
}

/// Parses SQL Server style date text.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD HH:MM:SS.fff`
/// and the `T`-separated ISO variants.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlDateParser;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

impl DateNormalizer for SqlDateParser {
    fn normalize(&self, raw: &str) -> ReportResult<NaiveDateTime> {
        let trimmed = raw.trim();
        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                return Ok(dt);
            }
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| ReportError::format(raw))
    }
}

/// Textual rendering of a single date, selected by the `date_format` code.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DateFormat {
    /// `YYYY-MM-DD`
    #[default]
    Iso,
    /// `MM/DD/YYYY`
    Us,
}

impl DateFormat {
    pub fn from_code(code: i64) -> ReportResult<Self> {
        match code {
            1 => Ok(Self::Iso),
            2 => Ok(Self::Us),
            other => Err(ReportError::Config(format!(
                "unrecognized date format code {other}"
            ))),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Iso => 1,
            Self::Us => 2,
        }
    }

    pub fn render(self, value: NaiveDateTime) -> String {
        match self {
            Self::Iso => value.format("%Y-%m-%d").to_string(),
            Self::Us => value.format("%m/%d/%Y").to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
