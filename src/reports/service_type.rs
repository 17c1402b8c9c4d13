//! Sales broken down by service type per agent or team.
//!
//! The attribute set is discovered while scanning: each service type seen
//! for a bucket becomes an attribute on that bucket's datum, so the output
//! has one row per (bucket, service type) pair actually present.

use std::time::Instant;

use crate::aggregation::Aggregation;
use crate::config::ReportParameters;
use crate::error::ReportResult;
use crate::grain::ReportMode;
use crate::rows::{Row, field};
use crate::stats::{average_of, count, currency_format, sum};

use super::pipeline::{GrainColumns, Grainer, RunStats};
use super::{Report, ReportContext};

const USER_COLUMN: usize = 0;
const DATE_COLUMN: usize = 1;
const AMOUNT_COLUMN: usize = 2;
const PROMO_COLUMN: usize = 3;
const SERVICE_TYPE_COLUMN: usize = 5;

const RETENTION_PROMO: &str = "RETSERVICE01";

/// Map a raw service type id (and the order's promo code) to its label.
pub fn service_type_label(service_type_id: &str, promo_code: &str) -> &'static str {
    match service_type_id.trim() {
        "14" if promo_code.trim() == RETENTION_PROMO => "Retention",
        "14" => "Incident",
        "15" => "Subscription",
        _ => "Other",
    }
}

/// Orders summed per bucket and service type.
///
/// Rows: `user, created_date, amount, promo_code, order_type, service_type_id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SalesByServiceType;

impl SalesByServiceType {
    const COLUMNS: GrainColumns = GrainColumns {
        user: Some(USER_COLUMN),
        date: DATE_COLUMN,
    };
}

impl Report for SalesByServiceType {
    fn name(&self) -> &'static str {
        "Sales by Service Type"
    }

    fn description(&self) -> &'static str {
        "Number of sales, total sales and average order value per service type."
    }

    fn modes(&self) -> &'static [ReportMode] {
        &[ReportMode::Stack]
    }

    fn schema(&self, _params: &ReportParameters) -> Vec<String> {
        ["User Grain", "Service Type", "# of Sales", "Total Sales ($)", "AOV ($)"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn run(
        &self,
        ctx: &ReportContext<'_>,
        rows: Vec<Row>,
        stats: &mut RunStats,
    ) -> ReportResult<Vec<Row>> {
        let started = Instant::now();
        let grainer = Grainer::new(ctx, ReportMode::Stack, true)?;
        let mut data = Aggregation::new();

        for row in &rows {
            let Some(grain) = grainer.classify(row, Self::COLUMNS)? else {
                stats.record(false);
                continue;
            };
            let amount = field(row, AMOUNT_COLUMN)?;
            let promo = row.get(PROMO_COLUMN).map(String::as_str).unwrap_or("");
            let service_type = service_type_label(field(row, SERVICE_TYPE_COLUMN)?, promo);

            let datum = data.add_datum(&grain);
            datum.add_attribute(service_type);
            datum.add_data(service_type, amount)?;
            stats.record(true);
        }
        stats.finish(started, data.size());

        let mut out = Vec::new();
        for (grain, datum) in data.iter() {
            for service_type in datum.attribute_names() {
                let values = datum.attribute_data(service_type).unwrap_or(&[]);
                let total = sum(values)?;
                let sales = count(values);
                out.push(vec![
                    grain.to_string(),
                    service_type.to_string(),
                    sales.to_string(),
                    currency_format(total),
                    currency_format(average_of(total, sales)),
                ]);
            }
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::SqlDateParser;
    use crate::roster::{InMemoryRoster, RosterScope, UserRecord};

    #[test]
    fn service_type_labels() {
        assert_eq!(service_type_label("14", "RETSERVICE01"), "Retention");
        assert_eq!(service_type_label("14", ""), "Incident");
        assert_eq!(service_type_label("14", "null"), "Incident");
        assert_eq!(service_type_label("14", "SPRING"), "Incident");
        assert_eq!(service_type_label("15", "RETSERVICE01"), "Subscription");
        assert_eq!(service_type_label("99", ""), "Other");
    }

    #[test]
    fn breakdown_rows_follow_discovery_order() {
        let roster = InMemoryRoster::new(
            vec![
                UserRecord::new("u1", "Agent One", "Sales"),
                UserRecord::new("u2", "Agent Two", "Sales"),
            ],
            &RosterScope::default(),
        );
        let params = ReportParameters {
            report_type: ReportMode::Stack,
            user_grain: 1,
            ..Default::default()
        };
        let ctx = ReportContext::new(&params, &SqlDateParser).with_roster(&roster);
        let rows: Vec<Row> = [
            ["u1", "2024-01-02", "49.99", "", "NEW", "15"],
            ["u1", "2024-01-02", "10.00", "RETSERVICE01", "NEW", "14"],
            ["u1", "2024-01-03", "50.01", "", "NEW", "15"],
            ["u2", "2024-01-03", "5.00", "", "NEW", "7"],
            ["ghost", "2024-01-03", "500.00", "", "NEW", "15"],
        ]
        .iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect();

        let mut stats = RunStats::default();
        let out = SalesByServiceType.run(&ctx, rows, &mut stats).unwrap();
        assert_eq!(
            out,
            vec![
                vec!["Agent One", "Subscription", "2", "100.00", "50.00"],
                vec!["Agent One", "Retention", "1", "10.00", "10.00"],
                vec!["Agent Two", "Other", "1", "5.00", "5.00"],
            ]
        );
        assert_eq!(stats.rows_excluded, 1);
        assert_eq!(stats.buckets, 2);
    }

    #[test]
    fn schema_has_five_columns() {
        assert_eq!(
            SalesByServiceType.schema(&ReportParameters::default()).len(),
            5
        );
    }
}
