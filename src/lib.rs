//! Call-center reporting core.
//!
//! Rows fetched by a query are classified into buckets (a time period, an
//! agent, or a team), accumulated per bucket and attribute, and reduced to
//! formatted output rows.
//!
//! ```
//! use callcenter_reports::{Aggregation, TimeGrain, time_grain};
//! use chrono::NaiveDate;
//!
//! let when = NaiveDate::from_ymd_opt(2024, 1, 10)
//!     .unwrap()
//!     .and_hms_opt(0, 0, 0)
//!     .unwrap();
//! let key = time_grain(TimeGrain::Week, when);
//!
//! let mut data = Aggregation::new();
//! data.accumulate(&key, "REFUND_COUNT", "12.50").unwrap();
//! assert_eq!(data.datum_ids().collect::<Vec<_>>(), vec!["2024-W02"]);
//! ```

pub mod aggregation;
pub mod cli;
pub mod config;
pub mod dates;
pub mod error;
pub mod grain;
pub mod reports;
pub mod roster;
pub mod rows;
pub mod stats;

pub use aggregation::{Aggregation, Datum, DatumIds};
pub use config::{ConfigError, ReportParameters};
pub use dates::{DateFormat, DateNormalizer, SqlDateParser};
pub use error::{ReportError, ReportResult};
pub use grain::{ReportMode, TimeGrain, UserGrain, time_grain, user_grain};
pub use reports::{Report, ReportContext, ReportKind, ReportOutput, execute};
pub use roster::{InMemoryRoster, Roster, RosterScope, UserRecord};
pub use rows::{CsvRowSource, Row, RowSource, RowSourceError, VecRowSource};

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Filtering follows `RUST_LOG` and defaults to `warn`. Output goes to stderr
/// so report tables and JSON on stdout stay clean. Calling this twice is a
/// no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
