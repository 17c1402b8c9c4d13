//! Shared per-row classification for grain-bucketed reports.

use std::time::Instant;

use serde::Serialize;

use crate::dates::DateNormalizer;
use crate::error::{ReportError, ReportResult};
use crate::grain::{ReportMode, TimeGrain, UserGrain, classify_user, time_grain};
use crate::roster::Roster;
use crate::rows::field;

use super::ReportContext;

/// Where the grain inputs live in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrainColumns {
    /// User identity column; `None` for reports that are not roster-scoped.
    pub user: Option<usize>,
    /// Date column used for time-trend bucketing.
    pub date: usize,
}

/// Row → bucket label, with granularity resolved once per run.
pub(crate) enum Grainer<'a> {
    Time {
        grain: TimeGrain,
        dates: &'a dyn DateNormalizer,
        roster: Option<&'a dyn Roster>,
    },
    User {
        grain: UserGrain,
        roster: &'a dyn Roster,
    },
}

impl<'a> Grainer<'a> {
    /// Resolve the granularity for `mode`.
    ///
    /// Stack mode and roster-scoped time reports need a roster; an unknown
    /// granularity code is a [`ReportError::Config`].
    pub(crate) fn new(
        ctx: &ReportContext<'a>,
        mode: ReportMode,
        roster_scoped: bool,
    ) -> ReportResult<Self> {
        match mode {
            ReportMode::TimeTrend => {
                let roster = if roster_scoped {
                    Some(require_roster(ctx)?)
                } else {
                    None
                };
                Ok(Self::Time {
                    grain: ctx.params.time_grain()?,
                    dates: ctx.dates,
                    roster,
                })
            }
            ReportMode::Stack => Ok(Self::User {
                grain: ctx.params.user_grain()?,
                roster: require_roster(ctx)?,
            }),
        }
    }

    /// Bucket label for `row`, or `None` when the row's user is outside the
    /// roster and the row must not be aggregated.
    pub(crate) fn classify(&self, row: &[String], cols: GrainColumns) -> ReportResult<Option<String>> {
        match self {
            Self::Time {
                grain,
                dates,
                roster,
            } => {
                if let (Some(roster), Some(col)) = (roster, cols.user)
                    && !roster.has_user(field(row, col)?)
                {
                    return Ok(None);
                }
                let when = dates.normalize(field(row, cols.date)?)?;
                Ok(Some(time_grain(*grain, when)))
            }
            Self::User { grain, roster } => {
                let col = cols.user.ok_or_else(|| {
                    ReportError::Config("report has no user column for stack mode".into())
                })?;
                Ok(classify_user(*roster, *grain, field(row, col)?))
            }
        }
    }
}

fn require_roster<'a>(ctx: &ReportContext<'a>) -> ReportResult<&'a dyn Roster> {
    ctx.roster
        .ok_or_else(|| ReportError::Config("this report requires a roster".into()))
}

/// Counters logged after a report consumes its rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub rows_read: usize,
    pub rows_aggregated: usize,
    /// Rows dropped because their user is not in the roster.
    pub rows_excluded: usize,
    pub buckets: usize,
    pub elapsed_ms: u64,
}

impl RunStats {
    pub(crate) fn record(&mut self, aggregated: bool) {
        self.rows_read += 1;
        if aggregated {
            self.rows_aggregated += 1;
        } else {
            self.rows_excluded += 1;
        }
    }

    pub(crate) fn finish(&mut self, started: Instant, buckets: usize) {
        self.buckets = buckets;
        self.elapsed_ms = started.elapsed().as_millis() as u64;
    }
}
