//! LP relaxation of a partially fixed model, solved with Clarabel.
//!
//! Fixed binaries are substituted as constants; the remaining variables are
//! relaxed to `[0, 1]`. Each row is scaled by its largest free coefficient
//! so that currency-denominated budget rows and unit-denominated demand rows
//! reach the interior-point solver with comparable magnitudes.

use super::model::{ExpansionModel, RowSense};
use super::ExpansionError;
use good_lp::solvers::clarabel::clarabel;
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
    Variable,
};

/// Outcome of one LP relaxation.
#[derive(Debug, Clone)]
pub(crate) enum Relaxation {
    /// Relaxed optimum; `values` covers every model variable (fixed ones as 0/1)
    Feasible { values: Vec<f64>, bound: f64 },
    Infeasible,
    Unbounded,
}

/// Solve the relaxation of `model` under `fixings` (`None` = free).
pub(crate) fn solve_relaxation(
    model: &ExpansionModel,
    fixings: &[Option<bool>],
) -> Result<Relaxation, ExpansionError> {
    let n = model.num_vars();
    debug_assert_eq!(fixings.len(), n);

    let fixed_value = |i: usize| match fixings[i] {
        Some(true) => 1.0,
        _ => 0.0,
    };

    // Everything fixed: evaluate directly instead of handing the solver an
    // empty problem.
    if fixings.iter().all(Option::is_some) {
        let values: Vec<f64> = (0..n).map(fixed_value).collect();
        let feasible = model.rows().iter().all(|row| row.is_satisfied(&values));
        return Ok(if feasible {
            let bound = model.objective_value(&values);
            Relaxation::Feasible { values, bound }
        } else {
            Relaxation::Infeasible
        });
    }

    let mut vars = ProblemVariables::new();
    let lp_vars: Vec<Option<Variable>> = fixings
        .iter()
        .map(|fix| match fix {
            None => Some(vars.add(variable().min(0.0).max(1.0))),
            Some(_) => None,
        })
        .collect();

    let obj_scale = model.objective_scale();
    let mut objective = Expression::from(0.0);
    for (var, lp_var) in model.vars().iter().zip(&lp_vars) {
        if let Some(v) = lp_var {
            if var.objective != 0.0 {
                objective += (var.objective / obj_scale) * *v;
            }
        }
    }

    let mut problem = vars.minimise(objective).using(clarabel);

    for row in model.rows() {
        let mut fixed_activity = 0.0;
        let mut row_scale: f64 = 0.0;
        for &(i, c) in &row.terms {
            if lp_vars[i].is_some() {
                row_scale = row_scale.max(c.abs());
            } else {
                fixed_activity += c * fixed_value(i);
            }
        }
        let rhs = row.rhs - fixed_activity;

        // Row fully determined by the fixings
        if row_scale == 0.0 {
            if row.sense.holds(0.0, rhs) {
                continue;
            }
            return Ok(Relaxation::Infeasible);
        }

        let mut expr = Expression::from(0.0);
        for &(i, c) in &row.terms {
            if let Some(v) = lp_vars[i] {
                expr += (c / row_scale) * v;
            }
        }
        let rhs = rhs / row_scale;

        problem = match row.sense {
            RowSense::LessEqual => problem.with(constraint!(expr <= rhs)),
            RowSense::GreaterEqual => problem.with(constraint!(expr >= rhs)),
            RowSense::Equal => problem.with(constraint!(expr == rhs)),
        };
    }

    match problem.solve() {
        Ok(solution) => {
            let values: Vec<f64> = lp_vars
                .iter()
                .enumerate()
                .map(|(i, lp_var)| match lp_var {
                    Some(v) => solution.value(*v).clamp(0.0, 1.0),
                    None => fixed_value(i),
                })
                .collect();
            let bound = model.objective_value(&values);
            Ok(Relaxation::Feasible { values, bound })
        }
        Err(ResolutionError::Infeasible) => Ok(Relaxation::Infeasible),
        Err(ResolutionError::Unbounded) => Ok(Relaxation::Unbounded),
        Err(e) => Err(ExpansionError::SolverUnavailable(format!(
            "clarabel failed on LP relaxation: {:?}",
            e
        ))),
    }
}
