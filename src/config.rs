//! Report parameters.
//!
//! Parameters are read from a TOML file and may be overridden from the CLI.
//! Granularity selectors are kept as the raw integer codes the parameter
//! source hands out; they are resolved (and rejected if unknown) when a
//! report run starts, before any row is classified.
//!
//! # Example
//!
//! ```toml
//! report_type = "time_trend"
//! time_grain = 3          # 1=day 2=week 3=month 4=quarter 5=year
//! user_grain = 2          # 1=agent 2=team
//! date_format = 1         # 1=YYYY-MM-DD 2=MM/DD/YYYY
//! start_date = "2024-01-01"
//! end_date = "2024-02-01"
//! team_names = ["Retention East"]
//! ```

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dates::DateFormat;
use crate::error::ReportResult;
use crate::grain::{ReportMode, TimeGrain, UserGrain};
use crate::roster::RosterScope;

/// Errors that can occur when loading configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

fn default_time_grain() -> i64 {
    TimeGrain::Month.code()
}

fn default_user_grain() -> i64 {
    UserGrain::Agent.code()
}

fn default_date_format() -> i64 {
    DateFormat::Iso.code()
}

/// Parameters for one report execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportParameters {
    /// Time-trend (bucket by date) or stack (bucket by agent/team).
    #[serde(default)]
    pub report_type: ReportMode,

    /// Time grain code.
    #[serde(default = "default_time_grain")]
    pub time_grain: i64,

    /// User grain code.
    #[serde(default = "default_user_grain")]
    pub user_grain: i64,

    /// Date format code for detail reports.
    #[serde(default = "default_date_format")]
    pub date_format: i64,

    /// Inclusive start of the reporting interval (`YYYY-MM-DD`).
    #[serde(default)]
    pub start_date: Option<String>,

    /// End of the reporting interval (`YYYY-MM-DD`).
    #[serde(default)]
    pub end_date: Option<String>,

    /// Agent allow-list for the roster (ids or display names).
    #[serde(default)]
    pub agent_names: Vec<String>,

    /// Team allow-list for the roster.
    #[serde(default)]
    pub team_names: Vec<String>,
}

impl Default for ReportParameters {
    fn default() -> Self {
        Self {
            report_type: ReportMode::default(),
            time_grain: default_time_grain(),
            user_grain: default_user_grain(),
            date_format: default_date_format(),
            start_date: None,
            end_date: None,
            agent_names: Vec::new(),
            team_names: Vec::new(),
        }
    }
}

impl ReportParameters {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn time_grain(&self) -> ReportResult<TimeGrain> {
        TimeGrain::from_code(self.time_grain)
    }

    pub fn user_grain(&self) -> ReportResult<UserGrain> {
        UserGrain::from_code(self.user_grain)
    }

    pub fn date_format(&self) -> ReportResult<DateFormat> {
        DateFormat::from_code(self.date_format)
    }

    pub fn is_time_trend(&self) -> bool {
        self.report_type == ReportMode::TimeTrend
    }

    pub fn is_stack(&self) -> bool {
        self.report_type == ReportMode::Stack
    }

    /// Roster scope built from the agent and team allow-lists.
    pub fn scope(&self) -> RosterScope {
        RosterScope {
            agent_names: self.agent_names.clone(),
            team_names: self.team_names.clone(),
        }
    }

    /// Check the reporting interval.
    ///
    /// Both bounds are optional, but if either is set then both must be set,
    /// both must be valid dates, and start must come strictly before end.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.start_date, &self.end_date) {
            (None, None) => Ok(()),
            (Some(_), None) | (None, Some(_)) => Err(ConfigError::Validation(
                "start_date and end_date must be given together".into(),
            )),
            (Some(start), Some(end)) => {
                let start = parse_bound("start_date", start)?;
                let end = parse_bound("end_date", end)?;
                if start >= end {
                    return Err(ConfigError::Validation(format!(
                        "start_date {start} must be before end_date {end}"
                    )));
                }
                Ok(())
            }
        }
    }
}

fn parse_bound(field: &str, raw: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ConfigError::Validation(format!("{field} '{raw}' is not a YYYY-MM-DD date")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
