//! Candidate expansion projects
//!
//! The [`Catalog`] is the fixed, ordered set of projects the planner may
//! choose from. Projects are immutable once loaded; the planner only decides
//! whether and when each one starts construction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a project inside its [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub usize);

impl ProjectId {
    pub fn new(index: usize) -> Self {
        ProjectId(index)
    }

    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A capacity-expansion project that could be built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique human-readable identifier (e.g. "New Production Line")
    pub id: String,
    /// One-time cost, charged in the year construction starts
    pub cost: f64,
    /// Years between construction start and usable capacity (may be fractional)
    pub lead_time_years: f64,
    /// Units of capacity added once the project is operational
    pub capacity_added: f64,
    /// Fractional multiplier on usable capacity (0.10 = +10%)
    pub efficiency_gain: f64,
}

impl Project {
    /// Create a project with no efficiency gain
    pub fn new(
        id: impl Into<String>,
        cost: f64,
        lead_time_years: f64,
        capacity_added: f64,
    ) -> Self {
        Self {
            id: id.into(),
            cost,
            lead_time_years,
            capacity_added,
            efficiency_gain: 0.0,
        }
    }

    /// Set the efficiency gain
    pub fn with_efficiency_gain(mut self, gain: f64) -> Self {
        self.efficiency_gain = gain;
        self
    }

    /// Usable capacity once operational: `capacity_added × (1 + efficiency_gain)`
    pub fn effective_capacity(&self) -> f64 {
        self.capacity_added * (1.0 + self.efficiency_gain)
    }
}

/// Ordered collection of candidate projects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    projects: Vec<Project>,
}

impl Catalog {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    /// Append a project and return its id
    pub fn push(&mut self, project: Project) -> ProjectId {
        self.projects.push(project);
        ProjectId::new(self.projects.len() - 1)
    }

    /// Builder-style append
    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.push(project);
        self
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, id: ProjectId) -> Option<&Project> {
        self.projects.get(id.value())
    }

    /// Iterate `(ProjectId, &Project)` pairs in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (ProjectId, &Project)> {
        self.projects
            .iter()
            .enumerate()
            .map(|(i, p)| (ProjectId::new(i), p))
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Look up a project by its string identifier
    pub fn find(&self, id: &str) -> Option<(ProjectId, &Project)> {
        self.iter().find(|(_, p)| p.id == id)
    }

    /// Total cost if every project were built
    pub fn max_investment_cost(&self) -> f64 {
        self.projects.iter().map(|p| p.cost).sum()
    }
}

impl FromIterator<Project> for Catalog {
    fn from_iter<I: IntoIterator<Item = Project>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
