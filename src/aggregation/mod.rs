//! Bucket-key → [`Datum`] container for a single report execution.
//!
//! An [`Aggregation`] is created fresh per run, filled during one pass over
//! the row source, read during one reduction pass, then dropped. Buckets are
//! enumerated in first-insertion order so output rows come out in a stable,
//! deterministic order.
//!
//! # Example
//!
//! ```
//! use callcenter_reports::aggregation::Aggregation;
//!
//! let mut agg = Aggregation::new();
//! let datum = agg.add_datum("2024-01");
//! datum.add_attribute("ACW_TIME");
//! datum.add_data("ACW_TIME", "120").unwrap();
//!
//! assert_eq!(agg.size(), 1);
//! assert_eq!(agg.datum_ids().collect::<Vec<_>>(), vec!["2024-01"]);
//! ```

mod datum;

pub use datum::Datum;

use rustc_hash::FxHashMap;

use crate::error::{ReportError, ReportResult};

/// Insertion-ordered mapping from bucket key to [`Datum`].
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    index: FxHashMap<String, usize>,
    buckets: Vec<(String, Datum)>,
}

impl Aggregation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a datum exists for `key` and return it.
    ///
    /// An existing datum is returned as-is; it is never replaced.
    pub fn add_datum(&mut self, key: &str) -> &mut Datum {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                let slot = self.buckets.len();
                self.index.insert(key.to_string(), slot);
                self.buckets.push((key.to_string(), Datum::new()));
                slot
            }
        };
        &mut self.buckets[slot].1
    }

    /// Datum for `key`; [`ReportError::NotFound`] if it was never added.
    pub fn datum(&self, key: &str) -> ReportResult<&Datum> {
        self.index
            .get(key)
            .map(|&slot| &self.buckets[slot].1)
            .ok_or_else(|| ReportError::not_found(key))
    }

    /// Mutable datum for `key`; [`ReportError::NotFound`] if it was never added.
    pub fn datum_mut(&mut self, key: &str) -> ReportResult<&mut Datum> {
        match self.index.get(key) {
            Some(&slot) => Ok(&mut self.buckets[slot].1),
            None => Err(ReportError::not_found(key)),
        }
    }

    /// Bucket keys in first-insertion order.
    ///
    /// The iterator borrows the aggregation and is cheap to recreate, so it
    /// can be restarted by calling this again.
    pub fn datum_ids(&self) -> DatumIds<'_> {
        DatumIds {
            inner: self.buckets.iter(),
        }
    }

    /// `(key, datum)` pairs in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Datum)> + '_ {
        self.buckets.iter().map(|(key, datum)| (key.as_str(), datum))
    }

    /// Number of distinct buckets.
    pub fn size(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of values accumulated across all buckets.
    pub fn value_count(&self) -> usize {
        self.buckets.iter().map(|(_, d)| d.value_count()).sum()
    }

    /// Register `attribute` on the bucket `key` (creating the bucket if needed)
    /// and append `value` to it. This is the per-row accumulate step every
    /// fixed-schema report performs.
    pub fn accumulate(
        &mut self,
        key: &str,
        attribute: &str,
        value: impl Into<String>,
    ) -> ReportResult<()> {
        let datum = self.add_datum(key);
        datum.add_attribute(attribute);
        datum.add_data(attribute, value)
    }
}

/// Lazy iterator over bucket keys, see [`Aggregation::datum_ids`].
#[derive(Debug, Clone)]
pub struct DatumIds<'a> {
    inner: std::slice::Iter<'a, (String, Datum)>,
}

impl<'a> Iterator for DatumIds<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key.as_str())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for DatumIds<'_> {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_add_datum_keeps_first_order() {
        let mut agg = Aggregation::new();
        for key in ["2024-02", "2024-01", "2024-02", "2024-03", "2024-01"] {
            agg.add_datum(key);
        }
        let ids: Vec<&str> = agg.datum_ids().collect();
        assert_eq!(ids, vec!["2024-02", "2024-01", "2024-03"]);
        assert_eq!(agg.size(), 3);
    }

    #[test]
    fn add_datum_does_not_overwrite() {
        let mut agg = Aggregation::new();
        agg.accumulate("team-x", "ACW_TIME", "120").unwrap();
        let again = agg.add_datum("team-x");
        assert_eq!(again.attribute_data("ACW_TIME").unwrap(), &["120"]);
    }

    #[test]
    fn datum_for_unknown_key_is_not_found() {
        let agg = Aggregation::new();
        assert_eq!(
            agg.datum("2024-W02").unwrap_err(),
            ReportError::NotFound {
                key: "2024-W02".into()
            }
        );
        let mut agg = agg;
        assert!(agg.datum_mut("nope").is_err());
    }

    #[test]
    fn datum_ids_is_restartable() {
        let mut agg = Aggregation::new();
        agg.add_datum("a");
        agg.add_datum("b");
        let first: Vec<&str> = agg.datum_ids().collect();
        let second: Vec<&str> = agg.datum_ids().collect();
        assert_eq!(first, second);
        assert_eq!(agg.datum_ids().len(), 2);
    }

    #[test]
    fn accumulate_registers_and_appends() {
        let mut agg = Aggregation::new();
        agg.accumulate("2024-01", "ACW_TIME", "120").unwrap();
        agg.accumulate("2024-01", "ACW_TIME", "60").unwrap();
        agg.accumulate("2024-02", "ACW_TIME", "30").unwrap();
        assert_eq!(agg.value_count(), 3);
        assert_eq!(
            agg.datum("2024-01")
                .unwrap()
                .attribute_data("ACW_TIME")
                .unwrap(),
            &["120", "60"]
        );
    }

    #[test]
    fn datum_mut_appends_to_registered_attribute() {
        let mut agg = Aggregation::new();
        agg.add_datum("k").add_attribute("x");
        agg.datum_mut("k").unwrap().add_data("x", "1").unwrap();
        assert_eq!(agg.datum("k").unwrap().attribute_data("x").unwrap(), &["1"]);
    }

    #[test]
    fn empty_aggregation() {
        let agg = Aggregation::new();
        assert!(agg.is_empty());
        assert_eq!(agg.datum_ids().next(), None);
        assert_eq!(agg.iter().count(), 0);
    }
}
