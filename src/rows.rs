//! Row sources: the already-executed query results a report consumes.
//!
//! A row is an ordered list of string fields. SQL NULL is represented as an
//! empty field or the literal text `null`; see [`is_null`].

use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::{ReportError, ReportResult};

/// One result row.
pub type Row = Vec<String>;

/// Errors raised while reading rows from an external source.
#[derive(Error, Debug)]
pub enum RowSourceError {
    #[error("Failed to open row file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read CSV rows: {0}")]
    Csv(#[from] csv::Error),
}

/// Produces the finite sequence of rows for one report execution.
pub trait RowSource {
    fn read_rows(&mut self) -> Result<Vec<Row>, RowSourceError>;
}

/// Rows held in memory.
#[derive(Debug, Clone, Default)]
pub struct VecRowSource {
    rows: Vec<Row>,
}

impl VecRowSource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Build from string-slice rows.
    pub fn from_strs<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }
}

impl RowSource for VecRowSource {
    fn read_rows(&mut self) -> Result<Vec<Row>, RowSourceError> {
        Ok(std::mem::take(&mut self.rows))
    }
}

/// Rows read from CSV text. Rows may have differing field counts.
pub struct CsvRowSource<R: Read> {
    reader: csv::Reader<R>,
}

impl CsvRowSource<std::fs::File> {
    /// Open a CSV file; `has_headers` skips the first line.
    pub fn from_path(path: &Path, has_headers: bool) -> Result<Self, RowSourceError> {
        let file = std::fs::File::open(path).map_err(|source| RowSourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(file, has_headers))
    }
}

impl<R: Read> CsvRowSource<R> {
    pub fn from_reader(reader: R, has_headers: bool) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(has_headers)
            .flexible(true)
            .from_reader(reader);
        Self { reader }
    }
}

impl<R: Read> RowSource for CsvRowSource<R> {
    fn read_rows(&mut self) -> Result<Vec<Row>, RowSourceError> {
        let mut rows = Vec::new();
        for record in self.reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }
}

/// Field `index` of `row`; a short row is a [`ReportError::Format`].
pub fn field(row: &[String], index: usize) -> ReportResult<&str> {
    row.get(index)
        .map(String::as_str)
        .ok_or_else(|| ReportError::format(&format!("row with {} fields (need {})", row.len(), index + 1)))
}

/// Whether a field holds SQL NULL.
pub fn is_null(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("null")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
