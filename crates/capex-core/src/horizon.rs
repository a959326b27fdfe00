//! Planning horizon: per-year demand, budget, and informational costs

use serde::{Deserialize, Serialize};

/// Annual cost figures carried alongside the planning data.
///
/// None of these depend on expansion decisions. They feed the cost
/// breakdown report only and never enter the optimization model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnualCosts {
    pub operational_cost: f64,
    pub required_labor_hours: f64,
    pub required_machinery_hours: f64,
    pub average_wage: f64,
    pub workforce_size: f64,
    /// Index of hiring difficulty (dimensionless)
    pub labor_market_tightness: f64,
    pub raw_material_cost: f64,
    pub compliance_cost: f64,
    pub environmental_compliance_cost: f64,
    pub labor_law_impact_cost: f64,
    pub technology_investment_cost: f64,
    pub expected_revenue: f64,
}

impl AnnualCosts {
    /// Labor hours priced at the average wage
    pub fn labor_cost(&self) -> f64 {
        self.required_labor_hours * self.average_wage
    }

    /// Machinery hours priced at the average wage
    pub fn machinery_cost(&self) -> f64 {
        self.required_machinery_hours * self.average_wage
    }

    /// Sum of every cost component except expansion spend
    pub fn total(&self) -> f64 {
        self.operational_cost
            + self.labor_cost()
            + self.machinery_cost()
            + self.raw_material_cost
            + self.compliance_cost
            + self.environmental_compliance_cost
            + self.labor_law_impact_cost
            + self.technology_investment_cost
    }
}

/// One planning year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: i32,
    /// Forecasted demand (units)
    pub demand: f64,
    /// Ceiling on expansion spend started in this year
    pub budget: f64,
    #[serde(default)]
    pub costs: AnnualCosts,
}

impl YearRecord {
    pub fn new(year: i32, demand: f64, budget: f64) -> Self {
        Self {
            year,
            demand,
            budget,
            costs: AnnualCosts::default(),
        }
    }

    pub fn with_costs(mut self, costs: AnnualCosts) -> Self {
        self.costs = costs;
        self
    }
}

/// Ordered planning years plus the capacity that exists before any project.
///
/// Years are expected to be contiguous and strictly increasing; this is
/// checked by [`crate::validation::validate_horizon`], not by the constructor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Horizon {
    years: Vec<YearRecord>,
    #[serde(default)]
    baseline_capacity: f64,
}

impl Horizon {
    pub fn new(years: Vec<YearRecord>) -> Self {
        Self {
            years,
            baseline_capacity: 0.0,
        }
    }

    pub fn with_baseline_capacity(mut self, capacity: f64) -> Self {
        self.baseline_capacity = capacity;
        self
    }

    pub fn baseline_capacity(&self) -> f64 {
        self.baseline_capacity
    }

    pub fn years(&self) -> &[YearRecord] {
        &self.years
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn first_year(&self) -> Option<i32> {
        self.years.first().map(|r| r.year)
    }

    pub fn last_year(&self) -> Option<i32> {
        self.years.last().map(|r| r.year)
    }

    /// Record for a calendar year, if it lies inside the horizon
    pub fn record(&self, year: i32) -> Option<&YearRecord> {
        let first = self.first_year()?;
        let offset = usize::try_from(year.checked_sub(first)?).ok()?;
        self.years.get(offset).filter(|r| r.year == year)
    }

    /// Largest single-year demand
    pub fn peak_demand(&self) -> f64 {
        self.years.iter().map(|r| r.demand).fold(0.0, f64::max)
    }

    pub fn total_budget(&self) -> f64 {
        self.years.iter().map(|r| r.budget).sum()
    }

    pub fn total_revenue(&self) -> f64 {
        self.years.iter().map(|r| r.costs.expected_revenue).sum()
    }

    /// Copy of this horizon with every budget multiplied by `factor`
    pub fn scale_budgets(&self, factor: f64) -> Self {
        let mut scaled = self.clone();
        for record in &mut scaled.years {
            record.budget *= factor;
        }
        scaled
    }

    /// Copy of this horizon with one year's budget replaced
    pub fn with_budget(&self, year: i32, budget: f64) -> Self {
        let mut updated = self.clone();
        if let Some(record) = updated.years.iter_mut().find(|r| r.year == year) {
            record.budget = budget;
        }
        updated
    }

    /// Copy of this horizon with one year's demand replaced
    pub fn with_demand(&self, year: i32, demand: f64) -> Self {
        let mut updated = self.clone();
        if let Some(record) = updated.years.iter_mut().find(|r| r.year == year) {
            record.demand = demand;
        }
        updated
    }
}
