//! Build plans and their per-year ledger

use super::config::LeadTimeRounding;
use super::model::{to_values, ExpansionModel, RowSense, VarKind};
use capex_core::{Catalog, Horizon};
use serde::{Deserialize, Serialize};

/// Build decision for one catalog project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionDecision {
    pub project: String,
    pub selected: bool,
    /// Year construction starts (`None` when not selected)
    pub start_year: Option<i32>,
    /// First year the added capacity is usable
    pub completion_year: Option<i32>,
    pub cost: f64,
    /// Effective capacity once operational
    pub capacity: f64,
}

impl SelectionDecision {
    pub fn is_built(&self) -> bool {
        self.selected
    }
}

/// Derived figures for one planning year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearLedger {
    pub year: i32,
    /// Cost of projects starting this year
    pub expansion_spend: f64,
    pub budget: f64,
    /// `budget − expansion_spend`
    pub budget_slack: f64,
    /// Baseline plus every project operational by this year
    pub capacity: f64,
    pub demand: f64,
    /// `capacity − demand`
    pub capacity_margin: f64,
    pub projects_started: Vec<String>,
    pub projects_completed: Vec<String>,
}

/// A feasible build plan.
///
/// Only created from an assignment that satisfied every model row; use
/// [`Plan::verify`] to re-check it against the inputs independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub decisions: Vec<SelectionDecision>,
    pub ledger: Vec<YearLedger>,
    /// Undiscounted expansion spend over the horizon
    pub total_cost: f64,
    /// Objective value (equals `total_cost` when undiscounted)
    pub objective: f64,
    pub lead_time_rounding: LeadTimeRounding,
}

impl Plan {
    /// Read decisions out of a 0/1 assignment over `model`'s variables.
    pub(crate) fn from_assignment(
        model: &ExpansionModel,
        catalog: &Catalog,
        horizon: &Horizon,
        assignment: &[bool],
        rounding: LeadTimeRounding,
    ) -> Self {
        let mut start_years: Vec<Option<i32>> = vec![None; catalog.len()];
        for (var, &on) in model.vars().iter().zip(assignment) {
            if let (VarKind::Start { project, year }, true) = (var.kind, on) {
                start_years[project.value()] = Some(year);
            }
        }

        let decisions: Vec<SelectionDecision> = catalog
            .iter()
            .map(|(id, project)| {
                let start_year = start_years[id.value()];
                SelectionDecision {
                    project: project.id.clone(),
                    selected: start_year.is_some(),
                    start_year,
                    completion_year: start_year.and_then(|y| model.completion_year(id, y)),
                    cost: project.cost,
                    capacity: project.effective_capacity(),
                }
            })
            .collect();

        let ledger = build_ledger(&decisions, horizon);
        let total_cost = decisions
            .iter()
            .filter(|d| d.selected)
            .map(|d| d.cost)
            .sum();

        Plan {
            decisions,
            ledger,
            total_cost,
            objective: model.objective_value(&to_values(assignment)),
            lead_time_rounding: rounding,
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = &SelectionDecision> {
        self.decisions.iter().filter(|d| d.selected)
    }

    pub fn num_selected(&self) -> usize {
        self.selected().count()
    }

    pub fn decision(&self, project: &str) -> Option<&SelectionDecision> {
        self.decisions.iter().find(|d| d.project == project)
    }

    pub fn ledger_for(&self, year: i32) -> Option<&YearLedger> {
        self.ledger.iter().find(|l| l.year == year)
    }

    /// Budget left unspent across the horizon
    pub fn total_budget_slack(&self) -> f64 {
        self.ledger.iter().map(|l| l.budget_slack).sum()
    }

    /// Every broken plan invariant, as human-readable messages
    pub fn violations(&self, catalog: &Catalog, horizon: &Horizon) -> Vec<String> {
        let mut problems = Vec::new();

        if self.decisions.len() != catalog.len() {
            problems.push(format!(
                "plan has {} decisions for {} catalog projects",
                self.decisions.len(),
                catalog.len()
            ));
            return problems;
        }

        let first_year = horizon.first_year().unwrap_or_default();
        let last_year = horizon.last_year().unwrap_or_default();

        for (decision, project) in self.decisions.iter().zip(catalog.projects()) {
            if decision.project != project.id {
                problems.push(format!(
                    "decision for '{}' is out of catalog order (expected '{}')",
                    decision.project, project.id
                ));
                continue;
            }
            match (decision.selected, decision.start_year, decision.completion_year) {
                (false, None, None) => {}
                (true, Some(start), completion) => {
                    let offset = self.lead_time_rounding.offset_years(project.lead_time_years);
                    let expected = start.checked_add(offset);
                    if start < first_year || !expected.is_some_and(|done| done <= last_year) {
                        problems.push(format!(
                            "project '{}' started {} does not complete within the horizon {}..{}",
                            project.id, start, first_year, last_year
                        ));
                    }
                    if completion != expected {
                        problems.push(format!(
                            "project '{}' started {} completes {:?} but lead time gives {:?}",
                            project.id, start, completion, expected
                        ));
                    }
                }
                _ => problems.push(format!(
                    "project '{}' must be selected exactly when it has a start year",
                    project.id
                )),
            }
        }

        // Recompute from decisions and the inputs, not from the stored ledger
        for ledger in build_ledger(&self.decisions, horizon) {
            let record = horizon.record(ledger.year);
            let demand = record.map_or(ledger.demand, |r| r.demand);
            let budget = record.map_or(ledger.budget, |r| r.budget);
            if !RowSense::GreaterEqual.holds(ledger.capacity, demand) {
                problems.push(format!(
                    "year {}: capacity {:.2} below demand {:.2}",
                    ledger.year, ledger.capacity, demand
                ));
            }
            if !RowSense::LessEqual.holds(ledger.expansion_spend, budget) {
                problems.push(format!(
                    "year {}: expansion spend {:.2} exceeds budget {:.2}",
                    ledger.year, ledger.expansion_spend, budget
                ));
            }
        }

        problems
    }

    /// Re-check demand, budget, and cardinality against the inputs.
    pub fn verify(&self, catalog: &Catalog, horizon: &Horizon) -> Result<(), String> {
        let problems = self.violations(catalog, horizon);
        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }
}

fn build_ledger(decisions: &[SelectionDecision], horizon: &Horizon) -> Vec<YearLedger> {
    horizon
        .years()
        .iter()
        .map(|record| {
            let started: Vec<&SelectionDecision> = decisions
                .iter()
                .filter(|d| d.start_year == Some(record.year))
                .collect();
            let expansion_spend: f64 = started.iter().map(|d| d.cost).sum();
            let capacity = horizon.baseline_capacity()
                + decisions
                    .iter()
                    .filter(|d| d.completion_year.is_some_and(|c| c <= record.year))
                    .map(|d| d.capacity)
                    .sum::<f64>();
            YearLedger {
                year: record.year,
                expansion_spend,
                budget: record.budget,
                budget_slack: record.budget - expansion_spend,
                capacity,
                demand: record.demand,
                capacity_margin: capacity - record.demand,
                projects_started: started.iter().map(|d| d.project.clone()).collect(),
                projects_completed: decisions
                    .iter()
                    .filter(|d| d.completion_year == Some(record.year))
                    .map(|d| d.project.clone())
                    .collect(),
            }
        })
        .collect()
}
