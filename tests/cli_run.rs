//! CLI subprocess tests: real binary, temp input files, exit codes and JSON.

mod util;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use util::{SAMPLE_ROSTER_TOML, TempFixtureDir};

fn base_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ccreport"));
    cmd.env_remove("RUST_LOG");
    cmd.env_remove("CCREPORT_PARAMS");
    cmd.env_remove("CCREPORT_ROSTER");
    cmd.env_remove("CCREPORT_REF_VALUES");
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn list_names_every_report() {
    base_cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("acw-time"))
        .stdout(contains("sales-by-service-type"))
        .stdout(contains("created-customers"));
}

#[test]
fn list_json_is_an_array() {
    let output = base_cmd().args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json.as_array().map(Vec::len), Some(6));
    assert_eq!(json[0]["id"], "acw-time");
}

#[test]
fn run_prints_table() {
    let fixtures = TempFixtureDir::new();
    let roster = fixtures.write("roster.toml", SAMPLE_ROSTER_TOML);
    let params = fixtures.write("params.toml", "time_grain = 3\n");
    let rows = fixtures.write(
        "rows.csv",
        "userA,2024-01-05 10:00:00.000,120\nuserB,2024-01-06 11:30:00.000,60\n",
    );

    base_cmd()
        .arg("run")
        .arg("acw-time")
        .arg("--params")
        .arg(&params)
        .arg("--roster")
        .arg(&roster)
        .arg("--rows")
        .arg(&rows)
        .assert()
        .success()
        .stdout("Date Grain\tMinutes\n2024-01\t3.00\n");
}

#[test]
fn run_json_with_overrides() {
    let fixtures = TempFixtureDir::new();
    let roster = fixtures.write("roster.toml", SAMPLE_ROSTER_TOML);
    let rows = fixtures.write(
        "rows.csv",
        "created_date,created_by,amount\n\
         2024-01-08,userA,10.00\n\
         2024-01-09,userC,12.00\n\
         2024-01-09,userC,null\n",
    );

    let output = base_cmd()
        .args(["run", "refund-count", "--mode", "stack", "--user-grain", "2", "--headers", "--json"])
        .arg("--roster")
        .arg(&roster)
        .arg("--rows")
        .arg(&rows)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["report"], "Refund Count");
    assert_eq!(json["schema"][0], "User Grain");
    assert_eq!(json["row_count"], 2);
    assert_eq!(json["rows"][0], serde_json::json!(["teamX", "1"]));
    assert_eq!(json["rows"][1], serde_json::json!(["teamY", "2"]));
    assert!(json["error"].is_null());
}

#[test]
fn report_error_exits_one_with_envelope() {
    let fixtures = TempFixtureDir::new();
    let roster = fixtures.write("roster.toml", SAMPLE_ROSTER_TOML);
    let rows = fixtures.write("rows.csv", "userA,2024-01-05,abc\n");

    let output = base_cmd()
        .args(["run", "acw-time", "--json"])
        .arg("--roster")
        .arg(&roster)
        .arg("--rows")
        .arg(&rows)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let stdout: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stdout["error"]["kind"], "format");
    assert_eq!(stdout["row_count"], 0);

    // Log lines come first; the envelope is the last line.
    let stderr = String::from_utf8_lossy(&output.stderr);
    let envelope: Value = serde_json::from_str(stderr.lines().last().unwrap()).unwrap();
    assert_eq!(envelope["error"]["kind"], "format");
    assert_eq!(envelope["error"]["code"], 1);
}

#[test]
fn unknown_grain_code_is_report_error() {
    let fixtures = TempFixtureDir::new();
    let roster = fixtures.write("roster.toml", SAMPLE_ROSTER_TOML);
    let rows = fixtures.write("rows.csv", "userA,2024-01-05,60\n");

    base_cmd()
        .args(["run", "acw-time", "--time-grain", "7"])
        .arg("--roster")
        .arg(&roster)
        .arg("--rows")
        .arg(&rows)
        .assert()
        .code(1)
        .stderr(contains("unrecognized time grain code 7"));
}

#[test]
fn invalid_interval_is_usage_error() {
    let fixtures = TempFixtureDir::new();
    let params = fixtures.write(
        "params.toml",
        "start_date = \"2024-02-01\"\nend_date = \"2024-01-01\"\n",
    );
    let rows = fixtures.write("rows.csv", "");

    base_cmd()
        .args(["run", "created-customer-volume"])
        .arg("--params")
        .arg(&params)
        .arg("--rows")
        .arg(&rows)
        .assert()
        .code(2)
        .stderr(contains("must be before"));
}

#[test]
fn missing_rows_file_is_usage_error() {
    base_cmd()
        .args(["run", "created-customer-volume", "--rows", "/no/such/rows.csv"])
        .assert()
        .code(2)
        .stderr(contains("/no/such/rows.csv"));
}

#[test]
fn unknown_report_is_usage_error() {
    base_cmd()
        .args(["run", "bogus", "--rows", "rows.csv"])
        .assert()
        .code(2)
        .stderr(predicate::str::is_empty().not());
}
