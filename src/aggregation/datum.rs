//! Per-bucket accumulator of named attribute value sequences.

use rustc_hash::FxHashMap;

use crate::error::{ReportError, ReportResult};

/// Accumulated raw values for one bucket, keyed by attribute name.
///
/// Attributes follow a register-then-append contract: [`Datum::add_attribute`]
/// must be called for a name before [`Datum::add_data`] accepts values for it.
/// Values stay as the raw strings read from the row; parsing is left to the
/// reduction step.
#[derive(Debug, Clone, Default)]
pub struct Datum {
    /// Attribute name → position in `series`.
    index: FxHashMap<String, usize>,
    /// Registered attributes in first-registration order.
    series: Vec<(String, Vec<String>)>,
}

impl Datum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`. Existing data is left untouched if already present.
    pub fn add_attribute(&mut self, name: &str) {
        if self.index.contains_key(name) {
            return;
        }
        self.index.insert(name.to_string(), self.series.len());
        self.series.push((name.to_string(), Vec::new()));
    }

    /// Append `value` to the sequence for `name`.
    ///
    /// Fails with [`ReportError::Schema`] if `name` was never registered.
    pub fn add_data(&mut self, name: &str, value: impl Into<String>) -> ReportResult<()> {
        let slot = *self
            .index
            .get(name)
            .ok_or_else(|| ReportError::schema(name))?;
        self.series[slot].1.push(value.into());
        Ok(())
    }

    /// Values appended for `name`, in append order.
    ///
    /// `None` means the attribute was never registered on this datum, which is
    /// not the same as `Some(&[])` (registered, nothing appended).
    pub fn attribute_data(&self, name: &str) -> Option<&[String]> {
        self.index
            .get(name)
            .map(|&slot| self.series[slot].1.as_slice())
    }

    /// Registered attribute names in the order they were first added.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.series.iter().map(|(name, _)| name.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Total number of values held across all attributes.
    pub fn value_count(&self) -> usize {
        self.series.iter().map(|(_, values)| values.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
