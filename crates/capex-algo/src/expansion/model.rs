//! Model Builder: Catalog + Horizon → binary linear program
//!
//! The model is kept solver-agnostic: a list of binary variables with
//! objective coefficients and a list of linear rows tagged with the
//! constraint family they belong to. Backends translate it into their own
//! representation; diagnosis drops whole families and re-solves.

use super::config::{LeadTimeRounding, SolverConfig};
use capex_core::{Catalog, Horizon, ProjectId};
use serde::Serialize;

/// Relative tolerance used when checking a row against an assignment.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// What a binary decision variable means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Project is built at some point in the horizon
    Selected(ProjectId),
    /// Project starts construction in `year`
    Start { project: ProjectId, year: i32 },
}

#[derive(Debug, Clone)]
pub struct ModelVar {
    pub kind: VarKind,
    /// Objective coefficient (discounted cost for start variables)
    pub objective: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSense {
    LessEqual,
    GreaterEqual,
    Equal,
}

impl RowSense {
    /// Whether `activity (sense) rhs` holds within a relative tolerance
    pub fn holds(&self, activity: f64, rhs: f64) -> bool {
        let tol = FEASIBILITY_TOLERANCE * rhs.abs().max(1.0);
        match self {
            RowSense::LessEqual => activity <= rhs + tol,
            RowSense::GreaterEqual => activity >= rhs - tol,
            RowSense::Equal => (activity - rhs).abs() <= tol,
        }
    }
}

/// Constraint families of the formulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintFamily {
    /// `selected(p) − Σ_y start(p,y) = 0`
    Linking,
    /// `Σ_y start(p,y) ≤ 1`
    SingleSelection,
    /// Cumulative operational capacity covers demand
    Demand,
    /// Expansion spend started in a year stays within its budget
    Budget,
}

#[derive(Debug, Clone)]
pub struct LinearRow {
    pub family: ConstraintFamily,
    /// Human-readable label ("demand[2021]", "single[Line A]", ...)
    pub label: String,
    /// Year the row belongs to, for demand and budget rows
    pub year: Option<i32>,
    /// Sparse `(variable index, coefficient)` pairs
    pub terms: Vec<(usize, f64)>,
    pub sense: RowSense,
    pub rhs: f64,
}

impl LinearRow {
    /// Row activity for a (possibly fractional) assignment
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|&(i, c)| c * values[i]).sum()
    }

    pub fn is_satisfied(&self, values: &[f64]) -> bool {
        self.sense.holds(self.activity(values), self.rhs)
    }
}

/// A start-year option for one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartOption {
    pub year: i32,
    pub var: usize,
}

/// Complete binary program for one solve.
///
/// Built fresh for every call; never shared between solves.
#[derive(Debug, Clone)]
pub struct ExpansionModel {
    vars: Vec<ModelVar>,
    rows: Vec<LinearRow>,
    /// `selected(p)` variable index per project
    selected: Vec<usize>,
    /// Eligible start years per project, ascending
    starts: Vec<Vec<StartOption>>,
    /// Whole-year lead-time offset per project
    offsets: Vec<i32>,
    /// `capacity_added × (1 + efficiency_gain)` per project
    effective_capacity: Vec<f64>,
    years: Vec<i32>,
    baseline_capacity: f64,
    /// Capacity available per year if every project started as early as possible
    max_reachable_capacity: Vec<f64>,
    demand: Vec<f64>,
}

/// Discount factor for spend in `year` relative to the first horizon year
pub fn discount_factor(rate: f64, first_year: i32, year: i32) -> f64 {
    if rate == 0.0 {
        1.0
    } else {
        1.0 / (1.0 + rate).powi(year - first_year)
    }
}

/// Translate a catalog and horizon into an [`ExpansionModel`].
///
/// Inputs are assumed valid (see [`capex_core::validate_inputs`]). An empty
/// horizon produces a model with no start variables.
pub fn build_model(catalog: &Catalog, horizon: &Horizon, config: &SolverConfig) -> ExpansionModel {
    build_with_rounding(
        catalog,
        horizon,
        config.lead_time_rounding,
        config.discount_rate,
    )
}

fn build_with_rounding(
    catalog: &Catalog,
    horizon: &Horizon,
    rounding: LeadTimeRounding,
    discount_rate: f64,
) -> ExpansionModel {
    let years: Vec<i32> = horizon.years().iter().map(|r| r.year).collect();
    let demand: Vec<f64> = horizon.years().iter().map(|r| r.demand).collect();
    let first_year = years.first().copied().unwrap_or_default();
    let last_year = years.last().copied().unwrap_or_default();
    let baseline = horizon.baseline_capacity();

    let mut vars = Vec::new();
    let mut selected = Vec::with_capacity(catalog.len());
    let mut starts = Vec::with_capacity(catalog.len());
    let mut offsets = Vec::with_capacity(catalog.len());
    let mut effective_capacity = Vec::with_capacity(catalog.len());

    // === Decision variables ===
    for (id, project) in catalog.iter() {
        let offset = rounding.offset_years(project.lead_time_years);
        offsets.push(offset);
        effective_capacity.push(project.effective_capacity());

        selected.push(vars.len());
        vars.push(ModelVar {
            kind: VarKind::Selected(id),
            objective: 0.0,
        });

        // Construction must finish on or before the last horizon year
        let mut options = Vec::new();
        for &year in &years {
            if !year.checked_add(offset).is_some_and(|done| done <= last_year) {
                break;
            }
            options.push(StartOption {
                year,
                var: vars.len(),
            });
            vars.push(ModelVar {
                kind: VarKind::Start { project: id, year },
                objective: project.cost * discount_factor(discount_rate, first_year, year),
            });
        }
        starts.push(options);
    }

    let mut rows = Vec::new();

    // === Linking and single selection ===
    for (id, project) in catalog.iter() {
        let p = id.value();
        let mut linking = vec![(selected[p], 1.0)];
        linking.extend(starts[p].iter().map(|s| (s.var, -1.0)));
        rows.push(LinearRow {
            family: ConstraintFamily::Linking,
            label: format!("link[{}]", project.id),
            year: None,
            terms: linking,
            sense: RowSense::Equal,
            rhs: 0.0,
        });

        rows.push(LinearRow {
            family: ConstraintFamily::SingleSelection,
            label: format!("single[{}]", project.id),
            year: None,
            terms: starts[p].iter().map(|s| (s.var, 1.0)).collect(),
            sense: RowSense::LessEqual,
            rhs: 1.0,
        });
    }

    // === Demand satisfaction ===
    // A start in year y contributes to year t only when y + offset ≤ t.
    let mut max_reachable_capacity = Vec::with_capacity(years.len());
    for (t_idx, &t) in years.iter().enumerate() {
        let mut terms = Vec::new();
        let mut reachable = baseline;
        for (p, options) in starts.iter().enumerate() {
            let cap = effective_capacity[p];
            let mut contributes = false;
            for option in options {
                if option.year.checked_add(offsets[p]).is_some_and(|done| done <= t) {
                    terms.push((option.var, cap));
                    contributes = true;
                }
            }
            if contributes {
                reachable += cap;
            }
        }
        max_reachable_capacity.push(reachable);
        rows.push(LinearRow {
            family: ConstraintFamily::Demand,
            label: format!("demand[{}]", t),
            year: Some(t),
            terms,
            sense: RowSense::GreaterEqual,
            rhs: demand[t_idx] - baseline,
        });
    }

    // === Annual budget ===
    // Cost is charged entirely in the start year.
    for record in horizon.years() {
        let terms = catalog
            .iter()
            .filter_map(|(id, project)| {
                starts[id.value()]
                    .iter()
                    .find(|s| s.year == record.year)
                    .map(|s| (s.var, project.cost))
            })
            .collect();
        rows.push(LinearRow {
            family: ConstraintFamily::Budget,
            label: format!("budget[{}]", record.year),
            year: Some(record.year),
            terms,
            sense: RowSense::LessEqual,
            rhs: record.budget,
        });
    }

    ExpansionModel {
        vars,
        rows,
        selected,
        starts,
        offsets,
        effective_capacity,
        years,
        baseline_capacity: baseline,
        max_reachable_capacity,
        demand,
    }
}

impl ExpansionModel {
    pub fn vars(&self) -> &[ModelVar] {
        &self.vars
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn rows(&self) -> &[LinearRow] {
        &self.rows
    }

    pub fn rows_in(&self, family: ConstraintFamily) -> impl Iterator<Item = &LinearRow> {
        self.rows.iter().filter(move |r| r.family == family)
    }

    pub fn num_projects(&self) -> usize {
        self.selected.len()
    }

    pub fn selected_var(&self, project: ProjectId) -> usize {
        self.selected[project.value()]
    }

    pub fn start_options(&self, project: ProjectId) -> &[StartOption] {
        &self.starts[project.value()]
    }

    pub fn lead_offset(&self, project: ProjectId) -> i32 {
        self.offsets[project.value()]
    }

    pub fn effective_capacity(&self, project: ProjectId) -> f64 {
        self.effective_capacity[project.value()]
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn baseline_capacity(&self) -> f64 {
        self.baseline_capacity
    }

    /// First year a project started in `start_year` is operational, or
    /// `None` when that year is not representable
    pub fn completion_year(&self, project: ProjectId, start_year: i32) -> Option<i32> {
        start_year.checked_add(self.lead_offset(project))
    }

    /// Largest objective coefficient magnitude (≥ 1 when all are zero)
    pub fn objective_scale(&self) -> f64 {
        let scale = self
            .vars
            .iter()
            .map(|v| v.objective.abs())
            .fold(0.0, f64::max);
        if scale > 0.0 {
            scale
        } else {
            1.0
        }
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.vars
            .iter()
            .zip(values)
            .map(|(v, x)| v.objective * x)
            .sum()
    }

    /// Labels of every row violated by a 0/1 assignment
    pub fn violated_rows(&self, assignment: &[bool]) -> Vec<&LinearRow> {
        let values = to_values(assignment);
        self.rows
            .iter()
            .filter(|row| !row.is_satisfied(&values))
            .collect()
    }

    pub fn is_feasible(&self, assignment: &[bool]) -> bool {
        let values = to_values(assignment);
        self.rows.iter().all(|row| row.is_satisfied(&values))
    }

    /// Years whose demand exceeds the capacity reachable by building every
    /// project as early as possible. Non-empty means no plan can exist,
    /// whatever the budgets.
    pub fn capacity_shortfall_years(&self) -> Vec<i32> {
        self.years
            .iter()
            .zip(&self.demand)
            .zip(&self.max_reachable_capacity)
            .filter(|((_, demand), reachable)| !RowSense::GreaterEqual.holds(**reachable, **demand))
            .map(|((year, _), _)| *year)
            .collect()
    }

    /// Copy of the model with one constraint family removed
    pub fn without_family(&self, family: ConstraintFamily) -> ExpansionModel {
        let mut relaxed = self.clone();
        relaxed.rows.retain(|row| row.family != family);
        relaxed
    }
}

pub(crate) fn to_values(assignment: &[bool]) -> Vec<f64> {
    assignment
        .iter()
        .map(|&b| if b { 1.0 } else { 0.0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use capex_core::{Project, YearRecord};

    fn three_year_horizon() -> Horizon {
        Horizon::new(vec![
            YearRecord::new(2020, 100.0, 10.0),
            YearRecord::new(2021, 150.0, 10.0),
            YearRecord::new(2022, 200.0, 10.0),
        ])
        .with_baseline_capacity(100.0)
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Project::new("Fast", 4.0, 0.0, 50.0),
            Project::new("Slow", 6.0, 1.5, 60.0).with_efficiency_gain(0.5),
            Project::new("Too Slow", 1.0, 3.0, 500.0),
        ])
    }

    #[test]
    fn test_start_years_respect_completion_window() {
        let model = build_model(&catalog(), &three_year_horizon(), &SolverConfig::default());

        let years = |p: usize| -> Vec<i32> {
            model
                .start_options(ProjectId::new(p))
                .iter()
                .map(|s| s.year)
                .collect()
        };
        assert_eq!(years(0), vec![2020, 2021, 2022]);
        // truncate(1.5) = 1: last feasible start is 2021
        assert_eq!(years(1), vec![2020, 2021]);
        assert!(years(2).is_empty());

        // 3 selected + 3 + 2 start variables
        assert_eq!(model.num_vars(), 8);
    }

    #[test]
    fn test_row_families_and_counts() {
        let model = build_model(&catalog(), &three_year_horizon(), &SolverConfig::default());
        assert_eq!(model.rows_in(ConstraintFamily::Linking).count(), 3);
        assert_eq!(model.rows_in(ConstraintFamily::SingleSelection).count(), 3);
        assert_eq!(model.rows_in(ConstraintFamily::Demand).count(), 3);
        assert_eq!(model.rows_in(ConstraintFamily::Budget).count(), 3);

        let relaxed = model.without_family(ConstraintFamily::Budget);
        assert_eq!(relaxed.rows_in(ConstraintFamily::Budget).count(), 0);
        assert_eq!(relaxed.rows().len(), 9);
    }

    #[test]
    fn test_demand_rows_gate_on_lead_time() {
        let model = build_model(&catalog(), &three_year_horizon(), &SolverConfig::default());
        let slow = ProjectId::new(1);
        let slow_vars: Vec<usize> = model.start_options(slow).iter().map(|s| s.var).collect();

        let demand_2020 = model
            .rows_in(ConstraintFamily::Demand)
            .find(|r| r.year == Some(2020))
            .unwrap();
        // Slow project started in 2020 is only usable from 2021
        assert!(demand_2020.terms.iter().all(|(v, _)| !slow_vars.contains(v)));
        assert!((demand_2020.rhs - 0.0).abs() < 1e-12);

        let demand_2022 = model
            .rows_in(ConstraintFamily::Demand)
            .find(|r| r.year == Some(2022))
            .unwrap();
        let slow_terms: Vec<f64> = demand_2022
            .terms
            .iter()
            .filter(|(v, _)| slow_vars.contains(v))
            .map(|(_, c)| *c)
            .collect();
        assert_eq!(slow_terms, vec![90.0, 90.0]);
    }

    #[test]
    fn test_budget_rows_charge_start_year_only() {
        let model = build_model(&catalog(), &three_year_horizon(), &SolverConfig::default());
        let budget_2022 = model
            .rows_in(ConstraintFamily::Budget)
            .find(|r| r.year == Some(2022))
            .unwrap();
        // Only "Fast" can start in 2022
        assert_eq!(budget_2022.terms.len(), 1);
        assert_eq!(budget_2022.terms[0].1, 4.0);
        assert_eq!(budget_2022.rhs, 10.0);
    }

    #[test]
    fn test_ceil_rounding_shrinks_start_window() {
        let config = SolverConfig::default().with_lead_time_rounding(LeadTimeRounding::Ceil);
        let model = build_model(&catalog(), &three_year_horizon(), &config);
        let slow: Vec<i32> = model
            .start_options(ProjectId::new(1))
            .iter()
            .map(|s| s.year)
            .collect();
        assert_eq!(slow, vec![2020]);
        assert_eq!(model.completion_year(ProjectId::new(1), 2020), Some(2022));
    }

    #[test]
    fn test_discounted_objective_coefficients() {
        let config = SolverConfig::default().with_discount_rate(0.10);
        let model = build_model(&catalog(), &three_year_horizon(), &config);
        let fast = model.start_options(ProjectId::new(0));
        let coeff = |var: usize| model.vars()[var].objective;
        assert!((coeff(fast[0].var) - 4.0).abs() < 1e-12);
        assert!((coeff(fast[1].var) - 4.0 / 1.1).abs() < 1e-12);
        assert!((coeff(fast[2].var) - 4.0 / 1.21).abs() < 1e-12);
    }

    #[test]
    fn test_capacity_shortfall_detection() {
        let horizon = Horizon::new(vec![
            YearRecord::new(2020, 100.0, 10.0),
            YearRecord::new(2021, 10_000.0, 10.0),
        ]);
        let model = build_model(&catalog(), &horizon, &SolverConfig::default());
        // 2020: Fast (50) + Slow only from 2021 → 50 < 100
        // 2021: Fast 50 + Slow 90 = 140 < 10_000
        assert_eq!(model.capacity_shortfall_years(), vec![2020, 2021]);
    }

    #[test]
    fn test_feasibility_check() {
        let catalog = Catalog::new(vec![Project::new("A", 5.0, 0.0, 10.0)]);
        let horizon = Horizon::new(vec![YearRecord::new(2020, 10.0, 5.0)]);
        let model = build_model(&catalog, &horizon, &SolverConfig::default());

        // [selected(A), start(A, 2020)]
        assert!(model.is_feasible(&[true, true]));
        assert!(!model.is_feasible(&[false, false]));
        let violated: Vec<&str> = model
            .violated_rows(&[true, false])
            .iter()
            .map(|r| r.label.as_str())
            .collect();
        assert_eq!(violated, vec!["link[A]", "demand[2020]"]);
    }

    #[test]
    fn test_lead_time_past_year_range_is_ineligible() {
        let catalog = Catalog::new(vec![
            Project::new("Never", 1.0, 1e10, 100.0),
            Project::new("Now", 5.0, 0.0, 100.0),
        ]);
        let horizon = Horizon::new(vec![YearRecord::new(2024, 50.0, 10.0)]);
        let model = build_model(&catalog, &horizon, &SolverConfig::default());

        assert_eq!(model.lead_offset(ProjectId::new(0)), i32::MAX);
        assert!(model.start_options(ProjectId::new(0)).is_empty());
        assert_eq!(model.completion_year(ProjectId::new(0), 2024), None);
        assert_eq!(model.start_options(ProjectId::new(1)).len(), 1);
        assert!(model.capacity_shortfall_years().is_empty());

        // Years at the top of the i32 range
        let edge = Horizon::new(vec![
            YearRecord::new(i32::MAX - 1, 50.0, 10.0),
            YearRecord::new(i32::MAX, 50.0, 10.0),
        ]);
        let slow = Catalog::new(vec![Project::new("Slow", 1.0, 5.0, 100.0)]);
        let model = build_model(&slow, &edge, &SolverConfig::default());
        assert!(model.start_options(ProjectId::new(0)).is_empty());
        assert_eq!(model.capacity_shortfall_years(), vec![i32::MAX - 1, i32::MAX]);
    }
}
