//! Integration tests for the `capex-cli` binary

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BUSINESS_HEADER: &str = "Year,Forecasted Demand,Operational Cost (USD),Required Labor Hours,\
Required Machinery Hours,Average Wage (USD),Workforce Size,Labor Market Tightness,\
Expected Total Revenue (USD),Expected Raw Material Cost (USD),Expected Compliance Cost (USD),\
Expected Environmental Compliance Cost (USD),Expected Labor Law Changes Impact Cost (USD),\
Expected Technology Investment Cost (USD),Annual Budget (USD)";

const EXPANSION_HEADER: &str =
    "Proposed Expansion,Cost (USD),Time to Build (year),Additional Capacity (units),Efficiency Gain";

/// Two years, one half-year project, no baseline capacity.
fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let business = dir.join("business.csv");
    let expansions = dir.join("expansions.csv");
    fs::write(
        &business,
        format!(
            "{BUSINESS_HEADER}\n\
             2024,15000,100000,1000,500,20,50,0.5,4000000,200000,10000,5000,1000,20000,5000000\n\
             2025,22000,110000,1100,550,21,52,0.5,4500000,210000,11000,5500,1100,21000,5000000\n"
        ),
    )
    .unwrap();
    fs::write(
        &expansions,
        format!("{EXPANSION_HEADER}\nNew Line,3000000,0.5,20000,0.10\n"),
    )
    .unwrap();
    (business, expansions)
}

fn input_args(business: &Path, expansions: &Path) -> Vec<String> {
    vec![
        "--business".into(),
        business.display().to_string(),
        "--expansions".into(),
        expansions.display().to_string(),
        "--baseline-capacity".into(),
        "0".into(),
    ]
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = cargo_bin_cmd!("capex-cli");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("solve"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("sweep"));
}

#[test]
fn test_solve_half_year_lead_truncated() {
    let dir = TempDir::new().unwrap();
    let (business, expansions) = write_inputs(dir.path());
    let out = dir.path().join("out");

    let mut cmd = cargo_bin_cmd!("capex-cli");
    cmd.arg("solve")
        .args(input_args(&business, &expansions))
        .args(["--mip-gap", "0", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: OPTIMAL"))
        .stdout(predicate::str::contains("[BUILD] New Line - start 2024"))
        .stdout(predicate::str::contains("Objective: $3000000.00"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("plan.json")).unwrap()).unwrap();
    assert_eq!(json["status"], "OPTIMAL");
    assert!(out.join("expansion_plan.csv").exists());
    assert!(out.join("summary_metrics.txt").exists());
}

#[test]
fn test_solve_half_year_lead_ceiled_is_infeasible() {
    let dir = TempDir::new().unwrap();
    let (business, expansions) = write_inputs(dir.path());

    let mut cmd = cargo_bin_cmd!("capex-cli");
    cmd.arg("solve")
        .args(input_args(&business, &expansions))
        .args(["--lead-time-rounding", "ceil"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: INFEASIBLE"))
        .stdout(predicate::str::contains("reachable capacity in 2024"));
}

#[test]
fn test_unknown_solver_fails() {
    let dir = TempDir::new().unwrap();
    let (business, expansions) = write_inputs(dir.path());

    let mut cmd = cargo_bin_cmd!("capex-cli");
    cmd.arg("solve")
        .args(input_args(&business, &expansions))
        .args(["--solver", "cplex"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not available"));
}

#[test]
fn test_validate_reports_inputs() {
    let dir = TempDir::new().unwrap();
    let (business, expansions) = write_inputs(dir.path());

    let mut cmd = cargo_bin_cmd!("capex-cli");
    cmd.arg("validate")
        .args(input_args(&business, &expansions))
        .assert()
        .success()
        .stdout(predicate::str::contains("Planning inputs are valid"))
        .stdout(predicate::str::contains("Years: 2024-2025"))
        .stdout(predicate::str::contains("Candidate projects: 1"));
}

#[test]
fn test_validate_missing_column_fails() {
    let dir = TempDir::new().unwrap();
    let (business, _) = write_inputs(dir.path());
    let expansions = dir.path().join("bad.csv");
    fs::write(&expansions, "Proposed Expansion,Cost (USD)\nLine,100\n").unwrap();

    let mut cmd = cargo_bin_cmd!("capex-cli");
    cmd.arg("validate")
        .args(input_args(&business, &expansions))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing columns"));
}

#[test]
fn test_sweep_over_budget_scales() {
    let dir = TempDir::new().unwrap();
    let (business, expansions) = write_inputs(dir.path());
    let out = dir.path().join("sweep.json");

    let mut cmd = cargo_bin_cmd!("capex-cli");
    cmd.arg("sweep")
        .args(input_args(&business, &expansions))
        .args(["--scales", "0.5,1.0", "--threads", "2", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("INFEASIBLE"))
        .stdout(predicate::str::contains("OPTIMAL"));

    let rows: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(rows[0]["scale"], 0.5);
    assert_eq!(rows[0]["status"], "INFEASIBLE");
    assert_eq!(rows[1]["status"], "OPTIMAL");
}

#[test]
fn test_validate_warns_about_unfundable_project() {
    let dir = TempDir::new().unwrap();
    let (business, _) = write_inputs(dir.path());
    let expansions = dir.path().join("pricey.csv");
    fs::write(
        &expansions,
        format!("{EXPANSION_HEADER}\nNew Line,3000000,0.5,20000,0.10\nMega Plant,9000000,0,50000,0\n"),
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("capex-cli");
    cmd.arg("validate")
        .args(input_args(&business, &expansions))
        .assert()
        .success()
        .stdout(predicate::str::contains("1 warning"))
        .stdout(predicate::str::contains("exceeds every annual budget (project 'Mega Plant')"));
}

#[test]
fn test_validate_reports_contract_violation() {
    let dir = TempDir::new().unwrap();
    let (business, _) = write_inputs(dir.path());
    let expansions = dir.path().join("negative.csv");
    fs::write(&expansions, format!("{EXPANSION_HEADER}\nNew Line,-5,0.5,20000,0.10\n")).unwrap();

    let mut cmd = cargo_bin_cmd!("capex-cli");
    cmd.arg("validate")
        .args(input_args(&business, &expansions))
        .assert()
        .failure()
        .stderr(predicate::str::contains("[error:validation]"))
        .stderr(predicate::str::contains("project 'New Line'"));
}
