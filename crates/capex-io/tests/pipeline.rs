//! Load → solve → export against the bundled sample files

use capex_algo::{build_and_solve, SolveStatus, SolverConfig};
use capex_core::validate_inputs;
use capex_io::export::{
    self, COST_BREAKDOWN_FILE, EXPANSION_PLAN_FILE, RESULT_JSON_FILE, SUMMARY_FILE,
};
use capex_io::{load_business_plan, load_expansion_costs};
use std::path::PathBuf;

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

#[test]
fn test_sample_files_load_cleanly() {
    let business = load_business_plan(data("business.csv"), 40_000.0).unwrap();
    let expansions = load_expansion_costs(data("expansions.csv")).unwrap();

    let years: Vec<i32> = business.value.years().iter().map(|r| r.year).collect();
    assert_eq!(years, vec![2024, 2025, 2026]);
    assert_eq!(business.diagnostics.warning_count(), 1);

    // Robotics Cell has no build time and is dropped
    assert_eq!(expansions.value.len(), 3);
    assert!(expansions.value.find("Robotics Cell").is_none());
    assert_eq!(expansions.diagnostics.warning_count(), 1);

    validate_inputs(&expansions.value, &business.value).unwrap();
}

#[test]
fn test_solve_and_write_reports() {
    let horizon = load_business_plan(data("business.csv"), 40_000.0)
        .unwrap()
        .value;
    let catalog = load_expansion_costs(data("expansions.csv")).unwrap().value;
    let result =
        build_and_solve(&catalog, &horizon, &SolverConfig::default().with_mip_gap(0.0)).unwrap();
    assert_eq!(result.status(), SolveStatus::Optimal);

    let dir = tempfile::tempdir().unwrap();
    let written = export::write_all(&result, &horizon, dir.path()).unwrap();
    assert_eq!(written.len(), 4);
    for name in [
        RESULT_JSON_FILE,
        EXPANSION_PLAN_FILE,
        COST_BREAKDOWN_FILE,
        SUMMARY_FILE,
    ] {
        assert!(dir.path().join(name).exists(), "{name} missing");
    }

    let mut rdr = csv::Reader::from_path(dir.path().join(EXPANSION_PLAN_FILE)).unwrap();
    let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        headers,
        vec![
            "Year",
            "Selected_Expansions",
            "Annual_Budget",
            "Annual_Total_Cost",
            "Annual_Budget_Savings"
        ]
    );
    let selected: Vec<(String, String)> = rdr
        .records()
        .map(|r| {
            let r = r.unwrap();
            (r[0].to_string(), r[1].to_string())
        })
        .collect();
    assert_eq!(
        selected,
        vec![
            ("2024".to_string(), "Automation".to_string()),
            ("2025".to_string(), "Line A".to_string()),
            ("2026".to_string(), "None".to_string()),
        ]
    );

    // 2024: 2M expansion + 1,759,200 informational costs
    let plan = result.plan().unwrap();
    let costs = export::cost_rows(plan, &horizon);
    assert!((costs[0].expansion_spend - 2_000_000.0).abs() < 1e-6);
    assert!((costs[0].labor_cost - 276_000.0).abs() < 1e-6);
    assert!((costs[0].total_cost - 3_759_200.0).abs() < 1e-6);

    let summary = std::fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap();
    assert!(summary.contains("Total revenue: 28,500,000"), "{summary}");
    assert!(summary.contains("Total budget: 15,000,000"), "{summary}");

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join(RESULT_JSON_FILE)).unwrap())
            .unwrap();
    assert_eq!(json["status"], "OPTIMAL");
    assert_eq!(json["plan"]["total_cost"], 7_000_000.0);
}

#[test]
fn test_infeasible_result_writes_json_only() {
    let horizon = load_business_plan(data("business.csv"), 40_000.0)
        .unwrap()
        .value
        .scale_budgets(0.1);
    let catalog = load_expansion_costs(data("expansions.csv")).unwrap().value;
    let result = build_and_solve(&catalog, &horizon, &SolverConfig::default()).unwrap();
    assert_eq!(result.status(), SolveStatus::Infeasible);

    let dir = tempfile::tempdir().unwrap();
    let written = export::write_all(&result, &horizon, &dir.path().join("out")).unwrap();
    assert_eq!(written.len(), 1);
    assert!(written[0].ends_with(RESULT_JSON_FILE));
}
