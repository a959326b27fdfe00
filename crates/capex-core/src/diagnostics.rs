//! Issues collected while loading planning data.
//!
//! Loaders record dropped or suspicious rows here instead of failing, so the
//! CLI can report them alongside the plan.
//!
//! ```
//! use capex_core::diagnostics::Diagnostics;
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning_at_row("load", "dropped row with empty Year", 4);
//! diag.add_warning_with_entity("validation", "zero demand", "year 2021");
//!
//! assert_eq!(diag.warning_count(), 2);
//! assert!(!diag.has_errors());
//! ```

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unusual but the load continued (e.g. dropped incomplete row)
    Warning,
    /// Could not load a record
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Grouping key ("load", "validation", ...)
    pub category: String,
    pub message: String,
    /// 1-based data row (header excluded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Entity reference (e.g. "year 2021", "project 'Line A'")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            row: None,
            entity: None,
        }
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };

        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;

        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }
        if let Some(row) = self.row {
            write!(f, " at row {}", row)?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: DiagnosticIssue) {
        self.issues.push(issue);
    }

    pub fn add_warning(&mut self, category: &str, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message));
    }

    pub fn add_warning_at_row(&mut self, category: &str, message: &str, row: usize) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message).with_row(row));
    }

    pub fn add_warning_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, category, message).with_entity(entity));
    }

    pub fn add_error_with_entity(&mut self, category: &str, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, category, message).with_entity(entity));
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
    }

    pub fn summary(&self) -> String {
        let plural = |n: usize| if n == 1 { "" } else { "s" };
        match (self.warning_count(), self.error_count()) {
            (0, 0) => "No issues".to_string(),
            (w, 0) => format!("{} warning{}", w, plural(w)),
            (0, e) => format!("{} error{}", e, plural(e)),
            (w, e) => format!("{} warning{}, {} error{}", w, plural(w), e, plural(e)),
        }
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Diagnostics: {}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_pluralization() {
        let mut diag = Diagnostics::new();
        assert_eq!(diag.summary(), "No issues");

        diag.add_warning("load", "one");
        assert_eq!(diag.summary(), "1 warning");

        diag.add_warning("load", "two");
        diag.add_error_with_entity("validation", "bad", "year 2020");
        assert_eq!(diag.summary(), "2 warnings, 1 error");
        assert!(diag.has_errors());
    }

    #[test]
    fn test_issue_display_includes_entity_and_row() {
        let issue = DiagnosticIssue::new(Severity::Warning, "load", "dropped")
            .with_entity("project 'A'")
            .with_row(7);
        assert_eq!(issue.to_string(), "[warning:load] dropped (project 'A') at row 7");
    }

    #[test]
    fn test_merge() {
        let mut a = Diagnostics::new();
        a.add_warning("load", "x");
        let mut b = Diagnostics::new();
        b.add_warning_at_row("load", "y", 2);
        a.merge(b);
        assert_eq!(a.warning_count(), 2);
    }
}
