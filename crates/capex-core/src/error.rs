//! Unified error type for the capex workspace
//!
//! Crate-specific errors (validation, solver) convert into [`CapexError`] so
//! callers at API boundaries can handle every failure the same way.
//!
//! # Example
//!
//! ```
//! use capex_core::{CapexError, CapexResult};
//!
//! fn parse_rate(raw: &str) -> CapexResult<f64> {
//!     raw.parse::<f64>()
//!         .map_err(|e| CapexError::Parse(format!("discount rate '{raw}': {e}")))
//! }
//!
//! assert!(parse_rate("0.05").is_ok());
//! assert!(parse_rate("five").is_err());
//! ```

use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CapexError {
    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Input contract violations
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Solver/algorithm errors
    #[error("Solver error: {0}")]
    Solver(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type CapexResult<T> = Result<T, CapexError>;

impl From<anyhow::Error> for CapexError {
    fn from(err: anyhow::Error) -> Self {
        CapexError::Other(err.to_string())
    }
}

impl From<String> for CapexError {
    fn from(s: String) -> Self {
        CapexError::Other(s)
    }
}

impl From<&str> for CapexError {
    fn from(s: &str) -> Self {
        CapexError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for CapexError {
    fn from(err: serde_json::Error) -> Self {
        CapexError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CapexError::Solver("backend crashed".into());
        assert!(err.to_string().contains("Solver error"));
        assert!(err.to_string().contains("backend crashed"));
    }

    #[test]
    fn test_validation_error_conversion_keeps_field() {
        let validation = ValidationError::new("project 'A'", "cost", "must be > 0, got 0");
        let err: CapexError = validation.into();
        assert!(matches!(err, CapexError::Validation(ref v) if v.field == "cost"));
        assert!(err.to_string().contains("project 'A'"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CapexError = io_err.into();
        assert!(matches!(err, CapexError::Io(_)));
    }
}
