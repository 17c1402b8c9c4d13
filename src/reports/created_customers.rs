//! Created-customer detail listing.
//!
//! Not a bucketed report: one output row per input row, with coded columns
//! translated to display values through a [`RefValueLookup`]. Lookups are
//! memoized in a [`RefValueCache`] owned by the single run, so repeated codes
//! hit the backing lookup once and nothing leaks across runs.

use std::path::Path;
use std::time::Instant;

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::config::{ConfigError, ReportParameters};
use crate::error::ReportResult;
use crate::grain::ReportMode;
use crate::rows::{Row, field, is_null};

use super::pipeline::RunStats;
use super::{Report, ReportContext};

const DATE_COLUMN: usize = 0;
const CUSTOMER_TYPE_COLUMN: usize = 1;
const SAN_COLUMN: usize = 2;
const PROMO_COLUMN: usize = 3;
const CALL_REASON_COLUMN: usize = 4;
const L1_CENTER_COLUMN: usize = 5;
const NO_SALE_REASON_COLUMN: usize = 6;

static REF_VALUE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\-]+$").expect("ref value id regex"));

/// Reference-value collaborator: coded id → display text.
pub trait RefValueLookup {
    fn display_value(&self, id: &str) -> Option<String>;
}

/// Reference values held in memory, loadable from TOML:
///
/// ```toml
/// [values]
/// 1001 = "Residential"
/// 1002 = "Business"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InMemoryRefValues {
    #[serde(default)]
    values: FxHashMap<String, String>,
}

impl InMemoryRefValues {
    pub fn new(values: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

impl RefValueLookup for InMemoryRefValues {
    fn display_value(&self, id: &str) -> Option<String> {
        self.values.get(id).cloned()
    }
}

/// Whether `id` is a well-formed reference-value id worth looking up.
pub fn is_ref_value_id(id: &str) -> bool {
    !is_null(id) && id != "-1" && REF_VALUE_ID.is_match(id)
}

/// Per-run memo in front of a [`RefValueLookup`].
pub struct RefValueCache<'a> {
    lookup: Option<&'a dyn RefValueLookup>,
    memo: FxHashMap<String, String>,
    backing_calls: usize,
}

impl<'a> RefValueCache<'a> {
    pub fn new(lookup: Option<&'a dyn RefValueLookup>) -> Self {
        Self {
            lookup,
            memo: FxHashMap::default(),
            backing_calls: 0,
        }
    }

    /// Display text for `id`; empty for malformed ids and unknown values.
    pub fn resolve(&mut self, id: &str) -> String {
        if !is_ref_value_id(id) {
            return String::new();
        }
        if let Some(hit) = self.memo.get(id) {
            return hit.clone();
        }
        self.backing_calls += 1;
        let value = self
            .lookup
            .and_then(|lookup| lookup.display_value(id))
            .unwrap_or_default();
        self.memo.insert(id.to_string(), value.clone());
        value
    }

    /// How many times the backing lookup was consulted.
    pub fn backing_calls(&self) -> usize {
        self.backing_calls
    }
}

/// Detail listing of created customers.
///
/// Rows: `created_date, customer_type, san, promo_code, marketing_call_reason,
/// l1_center, reason_for_no_sale`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreatedCustomers;

impl Report for CreatedCustomers {
    fn name(&self) -> &'static str {
        "Created Customers"
    }

    fn description(&self) -> &'static str {
        "Created Customer Details"
    }

    fn modes(&self) -> &'static [ReportMode] {
        &[ReportMode::TimeTrend, ReportMode::Stack]
    }

    fn schema(&self, _params: &ReportParameters) -> Vec<String> {
        [
            "Creation Date",
            "Customer Type",
            "SAN",
            "Promo Code",
            "Marketing Call Reason",
            "L1 Center",
            "No Sale Reason",
        ]
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
        let date_format = ctx.params.date_format()?;
        let mut refs = RefValueCache::new(ctx.ref_values);
        let mut out = Vec::with_capacity(rows.len());

        for row in &rows {
            let created = ctx.dates.normalize(field(row, DATE_COLUMN)?)?;
            let promo = field(row, PROMO_COLUMN)?;
            out.push(vec![
                date_format.render(created),
                refs.resolve(field(row, CUSTOMER_TYPE_COLUMN)?),
                field(row, SAN_COLUMN)?.to_string(),
                if is_null(promo) { String::new() } else { promo.to_string() },
                refs.resolve(field(row, CALL_REASON_COLUMN)?),
                refs.resolve(field(row, L1_CENTER_COLUMN)?),
                refs.resolve(field(row, NO_SALE_REASON_COLUMN)?),
            ]);
            stats.record(true);
        }

        tracing::debug!(
            lookups = refs.backing_calls(),
            "resolved reference values"
        );
        stats.finish(started, out.len());
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
    use std::cell::Cell;

    struct CountingLookup {
        inner: InMemoryRefValues,
        calls: Cell<usize>,
    }

    impl RefValueLookup for CountingLookup {
        fn display_value(&self, id: &str) -> Option<String> {
            self.calls.set(self.calls.get() + 1);
            self.inner.display_value(id)
        }
    }

    fn ref_values() -> InMemoryRefValues {
        InMemoryRefValues::new([
            ("1001".to_string(), "Residential".to_string()),
            ("2001".to_string(), "TV Ad".to_string()),
            ("3001".to_string(), "Center East".to_string()),
        ])
    }

    #[test]
    fn ref_value_id_validation() {
        assert!(is_ref_value_id("1001"));
        assert!(is_ref_value_id("AB-12"));
        assert!(!is_ref_value_id("-1"));
        assert!(!is_ref_value_id("null"));
        assert!(!is_ref_value_id(""));
        assert!(!is_ref_value_id("10; DROP TABLE"));
    }

    #[test]
    fn cache_memoizes_hits_and_misses() {
        let lookup = CountingLookup {
            inner: ref_values(),
            calls: Cell::new(0),
        };
        let mut cache = RefValueCache::new(Some(&lookup));
        assert_eq!(cache.resolve("1001"), "Residential");
        assert_eq!(cache.resolve("1001"), "Residential");
        assert_eq!(cache.resolve("9999"), "");
        assert_eq!(cache.resolve("9999"), "");
        assert_eq!(cache.resolve("-1"), "");
        assert_eq!(lookup.calls.get(), 2);
        assert_eq!(cache.backing_calls(), 2);
    }

    #[test]
    fn cache_without_lookup_resolves_empty() {
        let mut cache = RefValueCache::new(None);
        assert_eq!(cache.resolve("1001"), "");
    }

    #[test]
    fn parses_ref_values_toml() {
        let refs = InMemoryRefValues::from_toml_str("[values]\n1001 = \"Residential\"\n").unwrap();
        assert_eq!(refs.display_value("1001").as_deref(), Some("Residential"));
    }

    #[test]
    fn detail_rows_translate_codes() {
        let params = ReportParameters {
            date_format: 2,
            ..Default::default()
        };
        let refs = ref_values();
        let ctx = ReportContext::new(&params, &SqlDateParser).with_ref_values(&refs);
        let rows = vec![
            ["2024-01-05 08:00:00.0", "1001", "SAN-1", "null", "2001", "3001", "-1"],
            ["2024-01-06", "1001", "SAN-2", "SPRING", "", "3001", "4444"],
        ]
        .iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect();

        let out = CreatedCustomers
            .run(&ctx, rows, &mut RunStats::default())
            .unwrap();
        assert_eq!(
            out,
            vec![
                vec!["01/05/2024", "Residential", "SAN-1", "", "TV Ad", "Center East", ""],
                vec!["01/06/2024", "Residential", "SAN-2", "SPRING", "", "Center East", ""],
            ]
        );
    }
}
