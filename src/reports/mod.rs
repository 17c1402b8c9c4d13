//! Concrete reports and the execution boundary.
//!
//! Every report consumes already-fetched rows, classifies each one into a
//! bucket with the [`crate::grain`] classifiers, accumulates into an
//! [`crate::aggregation::Aggregation`], and reduces each bucket to one or
//! more output rows. [`execute`] wraps a run with its log span and turns a
//! [`ReportError`] into an error-bearing [`ReportOutput`].

mod created_customers;
mod metric;
mod pipeline;
mod service_type;

use std::sync::atomic::{AtomicU64, Ordering};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::config::ReportParameters;
use crate::dates::DateNormalizer;
use crate::error::{ReportError, ReportResult};
use crate::grain::ReportMode;
use crate::roster::Roster;
use crate::rows::{Row, RowSource, RowSourceError};

pub use created_customers::{
    CreatedCustomers, InMemoryRefValues, RefValueCache, RefValueLookup, is_ref_value_id,
};
pub use metric::{
    MetricReport, Reduction, acw_time, created_customer_volume, opened_cases, refund_count,
};
pub use pipeline::{GrainColumns, RunStats};
pub use service_type::{SalesByServiceType, service_type_label};

static NEXT_RUN_ID: AtomicU64 = AtomicU64::new(1);

/// Collaborators and parameters for one report execution.
#[derive(Clone, Copy)]
pub struct ReportContext<'a> {
    pub params: &'a ReportParameters,
    pub dates: &'a dyn DateNormalizer,
    pub roster: Option<&'a dyn Roster>,
    pub ref_values: Option<&'a dyn RefValueLookup>,
}

impl<'a> ReportContext<'a> {
    pub fn new(params: &'a ReportParameters, dates: &'a dyn DateNormalizer) -> Self {
        Self {
            params,
            dates,
            roster: None,
            ref_values: None,
        }
    }

    pub fn with_roster(mut self, roster: &'a dyn Roster) -> Self {
        self.roster = Some(roster);
        self
    }

    pub fn with_ref_values(mut self, ref_values: &'a dyn RefValueLookup) -> Self {
        self.ref_values = Some(ref_values);
        self
    }
}

/// A runnable report.
pub trait Report {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Modes this report can run in.
    fn modes(&self) -> &'static [ReportMode];

    /// Output column headings for a run with `params`.
    fn schema(&self, params: &ReportParameters) -> Vec<String>;

    /// Consume `rows` and produce output rows.
    fn run(
        &self,
        ctx: &ReportContext<'_>,
        rows: Vec<Row>,
        stats: &mut RunStats,
    ) -> ReportResult<Vec<Row>>;
}

/// Registry of the reports the CLI can run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    AcwTime,
    RefundCount,
    OpenedCases,
    CreatedCustomerVolume,
    SalesByServiceType,
    CreatedCustomers,
}

impl ReportKind {
    pub const ALL: [ReportKind; 6] = [
        ReportKind::AcwTime,
        ReportKind::RefundCount,
        ReportKind::OpenedCases,
        ReportKind::CreatedCustomerVolume,
        ReportKind::SalesByServiceType,
        ReportKind::CreatedCustomers,
    ];

    pub fn build(self) -> Box<dyn Report> {
        match self {
            Self::AcwTime => Box::new(acw_time()),
            Self::RefundCount => Box::new(refund_count()),
            Self::OpenedCases => Box::new(opened_cases()),
            Self::CreatedCustomerVolume => Box::new(created_customer_volume()),
            Self::SalesByServiceType => Box::new(SalesByServiceType),
            Self::CreatedCustomers => Box::new(CreatedCustomers),
        }
    }

    /// Command-line name, e.g. `acw-time`.
    pub fn slug(self) -> &'static str {
        match self {
            Self::AcwTime => "acw-time",
            Self::RefundCount => "refund-count",
            Self::OpenedCases => "opened-cases",
            Self::CreatedCustomerVolume => "created-customer-volume",
            Self::SalesByServiceType => "sales-by-service-type",
            Self::CreatedCustomers => "created-customers",
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

/// User-visible failure attached to a [`ReportOutput`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputError {
    pub kind: &'static str,
    pub message: String,
}

impl From<&ReportError> for OutputError {
    fn from(err: &ReportError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result of one report execution.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub report: String,
    pub mode: ReportMode,
    pub schema: Vec<String>,
    pub rows: Vec<Row>,
    pub stats: RunStats,
    pub error: Option<OutputError>,
}

impl ReportOutput {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Robot-mode payload.
    pub fn to_cli_json(&self) -> serde_json::Value {
        serde_json::json!({
            "report": self.report,
            "schema": self.schema,
            "rows": self.rows,
            "row_count": self.rows.len(),
            "error": self.error,
        })
    }

    /// Tab-separated table with the schema as header line.
    pub fn to_table(&self) -> String {
        let mut out = self.schema.iter().join("\t");
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.iter().join("\t"));
            out.push('\n');
        }
        out
    }
}

/// Run `report` over the rows of `source`.
///
/// Report failures end up in [`ReportOutput::error`] with no rows; only a
/// failure to read the row source itself is returned as `Err`.
pub fn execute(
    report: &dyn Report,
    ctx: &ReportContext<'_>,
    source: &mut dyn RowSource,
) -> Result<ReportOutput, RowSourceError> {
    let run_id = NEXT_RUN_ID.fetch_add(1, Ordering::Relaxed);
    let span = tracing::info_span!("report", name = report.name(), run_id);
    let _guard = span.enter();

    let mode = ctx.params.report_type;
    let mut output = ReportOutput {
        report: report.name().to_string(),
        mode,
        schema: report.schema(ctx.params),
        rows: Vec::new(),
        stats: RunStats::default(),
        error: None,
    };

    if !report.modes().contains(&mode) {
        let err = ReportError::Config(format!("{} does not support {mode} mode", report.name()));
        tracing::error!(kind = err.kind(), "{err}");
        output.error = Some(OutputError::from(&err));
        return Ok(output);
    }

    let rows = source.read_rows()?;
    tracing::debug!(rows = rows.len(), "row source drained");

    match report.run(ctx, rows, &mut output.stats) {
        Ok(rows) => {
            let stats = &output.stats;
            tracing::info!(
                rows_read = stats.rows_read,
                rows_aggregated = stats.rows_aggregated,
                rows_excluded = stats.rows_excluded,
                buckets = stats.buckets,
                elapsed_ms = stats.elapsed_ms,
                "query statistics"
            );
            output.rows = rows;
        }
        Err(err) => {
            tracing::error!(kind = err.kind(), "{err}");
            output.error = Some(OutputError::from(&err));
        }
    }
    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
