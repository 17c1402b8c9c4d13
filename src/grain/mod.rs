//! Grain classification: row data → bucket label.
//!
//! - [`time`] — date + [`TimeGrain`] → `2024-01-05` / `2024-W01` / `2024-01` / `2024-Q1` / `2024`
//! - [`user`] — roster user + [`UserGrain`] → agent display name or team

pub mod time;
pub mod user;

pub use time::{TimeGrain, time_grain, time_grain_for_code};
pub use user::{UserGrain, classify_user, user_grain};

use serde::{Deserialize, Serialize};

/// Which classification family a report run uses for its bucket keys.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    /// Buckets are time periods.
    #[default]
    TimeTrend,
    /// Buckets are agents or teams ("stack rank").
    Stack,
}

impl ReportMode {
    /// Heading of the grain column in report schemas.
    pub fn grain_heading(self) -> &'static str {
        match self {
            Self::TimeTrend => "Date Grain",
            Self::Stack => "User Grain",
        }
    }
}

impl std::fmt::Display for ReportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimeTrend => write!(f, "time_trend"),
            Self::Stack => write!(f, "stack"),
        }
    }
}
