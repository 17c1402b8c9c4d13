//! Error type shared by the aggregation core and the report pipeline.
//!
//! The core raises synchronously and never logs; the report-execution
//! boundary in [`crate::reports::execute`] decides what to do with it.

use thiserror::Error;

/// Failure raised while classifying, accumulating, or reducing report rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Data appended to an attribute that was never registered on its datum.
    #[error("attribute '{attribute}' was not registered before data was added")]
    Schema { attribute: String },

    /// Lookup of a bucket key that was never added to the aggregation.
    #[error("no datum for bucket '{key}'")]
    NotFound { key: String },

    /// A value that should be numeric (or a date) could not be parsed.
    #[error("value '{value}' is not in the expected format")]
    Format { value: String },

    /// Unrecognized granularity selector or other bad report configuration.
    #[error("report configuration error: {0}")]
    Config(String),
}

impl ReportError {
    /// Short machine-readable kind used in JSON error envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Schema { .. } => "schema",
            Self::NotFound { .. } => "not_found",
            Self::Format { .. } => "format",
            Self::Config(_) => "config",
        }
    }

    pub(crate) fn schema(attribute: &str) -> Self {
        Self::Schema {
            attribute: attribute.to_string(),
        }
    }

    pub(crate) fn not_found(key: &str) -> Self {
        Self::NotFound {
            key: key.to_string(),
        }
    }

    pub(crate) fn format(value: &str) -> Self {
        Self::Format {
            value: value.to_string(),
        }
    }
}

/// Convenience alias.
pub type ReportResult<T> = std::result::Result<T, ReportError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
