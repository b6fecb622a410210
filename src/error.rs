//! Error types for u-timetable.
//!
//! Only fatal conditions are errors. Unschedulable sections, missed
//! requests and solver failures that have a fallback are reported as data
//! in [`RunDiagnostics`](crate::optimizer::RunDiagnostics).

use thiserror::Error;

use crate::config::ConfigError;
use crate::validation::ValidationIssue;

/// Main error type for timetabling operations.
#[derive(Debug, Error)]
pub enum SchedulingError {
    /// A required table or column is missing or malformed.
    #[error("Input error in table '{table}', column '{column}': {message}")]
    Input {
        table: &'static str,
        column: &'static str,
        message: String,
    },

    /// Structural problems found while validating input tables.
    #[error("Input validation failed with {} issue(s): {}", .0.len(), summarize(.0))]
    Validation(Vec<ValidationIssue>),

    /// Configuration could not be loaded or is inconsistent.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The input document is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O failure while reading tables.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Neither a warm start nor a solver incumbent is available.
    #[error("No feasible assignment: {0}")]
    NoFeasibleAssignment(String),
}

impl SchedulingError {
    /// Creates an input error for `table.column`.
    pub fn input(table: &'static str, column: &'static str, message: impl Into<String>) -> Self {
        Self::Input {
            table,
            column,
            message: message.into(),
        }
    }
}

fn summarize(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .take(3)
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for timetabling operations.
pub type Result<T> = std::result::Result<T, SchedulingError>;
