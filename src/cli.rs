//! Command-line surface for `ccreport`.
//!
//! ```text
//! ccreport list [--json]
//! ccreport run <report> --rows rows.csv [--params params.toml] [--roster roster.toml]
//!              [--ref-values refvals.toml] [--time-grain N] [--user-grain N]
//!              [--date-format N] [--mode time-trend|stack] [--headers] [--json]
//! ```
//!
//! Exit codes: `0` success, `1` the report itself failed, `2` bad usage or
//! unreadable input files.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::config::ReportParameters;
use crate::dates::SqlDateParser;
use crate::grain::ReportMode;
use crate::reports::{InMemoryRefValues, ReportContext, ReportKind, execute};
use crate::roster::InMemoryRoster;
use crate::rows::CsvRowSource;

pub const EXIT_REPORT_ERROR: i32 = 1;
pub const EXIT_USAGE_ERROR: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "ccreport")]
#[command(version, about = "Run call-center reports over exported query rows", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the available reports
    List {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Run one report over a CSV of query rows
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Report to run
    #[arg(value_enum)]
    pub report: ReportKind,

    /// Report parameters (TOML); defaults apply when omitted
    #[arg(long, env = "CCREPORT_PARAMS")]
    pub params: Option<PathBuf>,

    /// Query rows (CSV)
    #[arg(long)]
    pub rows: PathBuf,

    /// Treat the first CSV line as a header and skip it
    #[arg(long)]
    pub headers: bool,

    /// Roster of users (TOML `[[users]]`)
    #[arg(long, env = "CCREPORT_ROSTER")]
    pub roster: Option<PathBuf>,

    /// Reference values (TOML `[values]`)
    #[arg(long, env = "CCREPORT_REF_VALUES")]
    pub ref_values: Option<PathBuf>,

    /// Override the time grain code (1=day 2=week 3=month 4=quarter 5=year)
    #[arg(long)]
    pub time_grain: Option<i64>,

    /// Override the user grain code (1=agent 2=team)
    #[arg(long)]
    pub user_grain: Option<i64>,

    /// Override the date format code (1=ISO 2=US)
    #[arg(long)]
    pub date_format: Option<i64>,

    /// Override the report mode
    #[arg(long, value_enum)]
    pub mode: Option<ReportMode>,

    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Apply command-line overrides on top of file parameters.
    pub fn apply_overrides(&self, params: &mut ReportParameters) {
        if let Some(mode) = self.mode {
            params.report_type = mode;
        }
        if let Some(code) = self.time_grain {
            params.time_grain = code;
        }
        if let Some(code) = self.user_grain {
            params.user_grain = code;
        }
        if let Some(code) = self.date_format {
            params.date_format = code;
        }
    }
}

/// Failure surfaced to `main`, carrying the process exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    pub code: i32,
    pub kind: &'static str,
    pub message: String,
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            code: EXIT_USAGE_ERROR,
            kind: "usage",
            message: message.into(),
        }
    }

    /// JSON envelope printed on stderr in robot mode.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.code,
                "kind": self.kind,
                "message": self.message,
            }
        })
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            code: EXIT_USAGE_ERROR,
            kind: "input",
            message: format!("{err:#}"),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

/// Parse arguments. `--help` and `--version` print and exit here.
pub fn parse_cli<I, T>(args: I) -> Result<Cli, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(cli),
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => Err(CliError::usage(err.to_string().trim_end())),
    }
}

pub fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::List { json } => {
            list_reports(json);
            Ok(())
        }
        Commands::Run(args) => run_report(&args),
    }
}

fn list_reports(json: bool) {
    if json {
        let reports: Vec<_> = ReportKind::ALL
            .iter()
            .map(|kind| {
                let report = kind.build();
                serde_json::json!({
                    "id": kind.slug(),
                    "name": report.name(),
                    "description": report.description(),
                    "modes": report.modes(),
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(reports));
        return;
    }
    for kind in ReportKind::ALL {
        let report = kind.build();
        println!("{:<26}{}", kind.slug(), report.description());
    }
}

fn run_report(args: &RunArgs) -> Result<(), CliError> {
    let mut params = match &args.params {
        Some(path) => ReportParameters::load(path)
            .with_context(|| format!("loading parameters from {}", path.display()))?,
        None => ReportParameters::default(),
    };
    args.apply_overrides(&mut params);
    params.validate().map_err(|err| CliError {
        code: EXIT_USAGE_ERROR,
        kind: "config",
        message: err.to_string(),
    })?;

    let roster = args
        .roster
        .as_deref()
        .map(|path| {
            InMemoryRoster::load(path, &params.scope())
                .with_context(|| format!("loading roster from {}", path.display()))
        })
        .transpose()?;
    let ref_values = args
        .ref_values
        .as_deref()
        .map(|path| {
            InMemoryRefValues::load(path)
                .with_context(|| format!("loading reference values from {}", path.display()))
        })
        .transpose()?;

    let mut ctx = ReportContext::new(&params, &SqlDateParser);
    if let Some(roster) = &roster {
        tracing::debug!(users = roster.len(), "roster loaded");
        ctx = ctx.with_roster(roster);
    }
    if let Some(ref_values) = &ref_values {
        ctx = ctx.with_ref_values(ref_values);
    }

    let mut source = CsvRowSource::from_path(&args.rows, args.headers)
        .with_context(|| format!("opening rows {}", args.rows.display()))?;
    let report = args.report.build();
    let output = execute(report.as_ref(), &ctx, &mut source)
        .with_context(|| format!("reading rows {}", args.rows.display()))?;

    if args.json {
        println!("{}", output.to_cli_json());
    } else if output.is_ok() {
        print!("{}", output.to_table());
    }

    match output.error {
        None => Ok(()),
        Some(err) => Err(CliError {
            code: EXIT_REPORT_ERROR,
            kind: err.kind,
            message: err.message,
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
