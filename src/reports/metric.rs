//! Single-attribute metric reports: one value column per bucket.
//!
//! ACW time, refund count, opened cases and created-customer volume all
//! follow the same pass: classify the row, append one field to one
//! attribute, then reduce that attribute per bucket.

use std::time::Instant;

use rust_decimal::Decimal;

use crate::aggregation::Aggregation;
use crate::config::ReportParameters;
use crate::error::ReportResult;
use crate::grain::ReportMode;
use crate::rows::{Row, field};
use crate::stats::{average, count, currency_format, sum};

use super::pipeline::{GrainColumns, Grainer, RunStats};
use super::{Report, ReportContext};

const SECONDS_PER_MINUTE: i64 = 60;

/// How a bucket's attribute values collapse into the output cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Number of values, rendered as an integer.
    Count,
    /// Decimal total, currency-formatted.
    Sum,
    /// Decimal mean, currency-formatted; zero when empty.
    Average,
    /// Total of second counts converted to minutes, currency-formatted.
    SecondsAsMinutes,
}

impl Reduction {
    /// Reduce one attribute. An unregistered attribute (`None`) means no row
    /// matched and reduces to zero.
    pub fn apply(self, values: Option<&[String]>) -> ReportResult<String> {
        let values = values.unwrap_or(&[]);
        Ok(match self {
            Self::Count => count(values).to_string(),
            Self::Sum => currency_format(sum(values)?),
            Self::Average => currency_format(average(values)?),
            Self::SecondsAsMinutes => {
                currency_format(sum(values)? / Decimal::from(SECONDS_PER_MINUTE))
            }
        })
    }
}

/// A report that buckets rows by grain and reduces one attribute.
#[derive(Debug, Clone)]
pub struct MetricReport {
    pub name: &'static str,
    pub description: &'static str,
    /// Heading of the value column.
    pub value_heading: &'static str,
    pub attribute: &'static str,
    pub columns: GrainColumns,
    /// Column holding the value appended to `attribute`.
    pub value_column: usize,
    pub reduction: Reduction,
    pub modes: &'static [ReportMode],
}

impl MetricReport {
    /// Classify and accumulate every row, returning the filled aggregation.
    pub fn accumulate(
        &self,
        ctx: &ReportContext<'_>,
        rows: &[Row],
        stats: &mut RunStats,
    ) -> ReportResult<Aggregation> {
        let grainer = Grainer::new(ctx, ctx.params.report_type, self.columns.user.is_some())?;
        let mut data = Aggregation::new();

        for row in rows {
            let Some(grain) = grainer.classify(row, self.columns)? else {
                stats.record(false);
                continue;
            };
            let value = field(row, self.value_column)?;
            data.accumulate(&grain, self.attribute, value)?;
            stats.record(true);
        }

        Ok(data)
    }

    /// Reduce each bucket to `[grain, value]`, in bucket order.
    pub fn reduce(&self, data: &Aggregation) -> ReportResult<Vec<Row>> {
        let mut out = Vec::with_capacity(data.size());
        for grain in data.datum_ids() {
            let datum = data.datum(grain)?;
            let value = self.reduction.apply(datum.attribute_data(self.attribute))?;
            out.push(vec![grain.to_string(), value]);
        }
        Ok(out)
    }
}

impl Report for MetricReport {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn modes(&self) -> &'static [ReportMode] {
        self.modes
    }

    fn schema(&self, params: &ReportParameters) -> Vec<String> {
        vec![
            params.report_type.grain_heading().to_string(),
            self.value_heading.to_string(),
        ]
    }

    fn run(
        &self,
        ctx: &ReportContext<'_>,
        rows: Vec<Row>,
        stats: &mut RunStats,
    ) -> ReportResult<Vec<Row>> {
        let started = Instant::now();
        let data = self.accumulate(ctx, &rows, stats)?;
        stats.finish(started, data.size());
        self.reduce(&data)
    }
}

/// After-call-work time in minutes. Rows: `user, date, acw_seconds`.
pub fn acw_time() -> MetricReport {
    MetricReport {
        name: "ACW Time",
        description: "ACW Time in minutes.",
        value_heading: "Minutes",
        attribute: "ACW_TIME",
        columns: GrainColumns {
            user: Some(0),
            date: 1,
        },
        value_column: 2,
        reduction: Reduction::SecondsAsMinutes,
        modes: &[ReportMode::TimeTrend, ReportMode::Stack],
    }
}

/// Number of refunds. Rows: `created_date, created_by, refund_amount`.
pub fn refund_count() -> MetricReport {
    MetricReport {
        name: "Refund Count",
        description: "A count of refunds.",
        value_heading: "Refund Count",
        attribute: "REFUND_COUNT",
        columns: GrainColumns {
            user: Some(1),
            date: 0,
        },
        value_column: 2,
        reduction: Reduction::Count,
        modes: &[ReportMode::TimeTrend, ReportMode::Stack],
    }
}

/// Number of opened cases. Rows: `updated_date, user, case_id`.
pub fn opened_cases() -> MetricReport {
    MetricReport {
        name: "Opened Cases",
        description: "A count of opened cases.",
        value_heading: "Case Count",
        attribute: "CASE_IDS",
        columns: GrainColumns {
            user: Some(1),
            date: 0,
        },
        value_column: 2,
        reduction: Reduction::Count,
        modes: &[ReportMode::TimeTrend, ReportMode::Stack],
    }
}

/// Number of created customers over time; not roster-scoped.
/// Rows: `created_date, customer_type, san, ...`.
pub fn created_customer_volume() -> MetricReport {
    MetricReport {
        name: "Created Customer Volume",
        description: "Number of customers created per period.",
        value_heading: "Created Customers",
        attribute: "CREATED_CUSTOMERS",
        columns: GrainColumns {
            user: None,
            date: 0,
        },
        value_column: 2,
        reduction: Reduction::Count,
        modes: &[ReportMode::TimeTrend],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
