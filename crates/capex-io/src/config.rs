//! Solver configuration files (TOML)
//!
//! Every [`SolverConfig`] field is optional in the file:
//!
//! ```toml
//! time_limit_seconds = 60
//! mip_gap = 0.0
//! lead_time_rounding = "ceil"
//! discount_rate = 0.05
//! ```

use anyhow::{Context, Result};
use capex_algo::SolverConfig;
use std::fs;
use std::path::Path;

/// Read and validate a solver configuration file.
pub fn load_solver_config(path: impl AsRef<Path>) -> Result<SolverConfig> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading solver config {}", path.display()))?;
    parse_solver_config(&raw).with_context(|| format!("parsing solver config {}", path.display()))
}

pub fn parse_solver_config(raw: &str) -> Result<SolverConfig> {
    let config: SolverConfig = toml::from_str(raw).context("invalid TOML")?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use capex_algo::LeadTimeRounding;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse_solver_config("lead_time_rounding = \"ceil\"\nnode_limit = 50\n").unwrap();
        assert_eq!(config.lead_time_rounding, LeadTimeRounding::Ceil);
        assert_eq!(config.node_limit, Some(50));
        assert_eq!(config.mip_gap, SolverConfig::default().mip_gap);
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let err = parse_solver_config("mip_gap = 1.5").unwrap_err();
        assert!(err.to_string().contains("mip_gap"), "{err}");
        assert!(parse_solver_config("lead_time_rounding = \"sideways\"").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "time_limit_seconds = 30.0").unwrap();
        writeln!(file, "backend = \"clarabel\"").unwrap();

        let config = load_solver_config(file.path()).unwrap();
        assert_eq!(config.time_limit_seconds, Some(30.0));

        let missing = load_solver_config("/nonexistent/solver.toml").unwrap_err();
        assert!(missing.to_string().contains("reading solver config"));
    }
}
