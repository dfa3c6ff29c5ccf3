//! Error types for the WBR computation engine.
//!
//! All errors here are fatal: the engine never retries and never suppresses
//! a failure. Division-by-zero and overflow inside comparisons are *not*
//! errors — they resolve to "N/A"/null per [`crate::comparison`].

use thiserror::Error;

/// Top-level error produced by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    UnknownReference(#[from] UnknownReferenceError),

    #[error(transparent)]
    CircularDependency(#[from] CircularDependencyError),

    #[error(transparent)]
    DataShape(#[from] DataShapeError),
}

fn line_suffix(line: Option<u32>) -> String {
    match line {
        Some(l) => format!(" at line {l}"),
        None => String::new(),
    }
}

/// The `setup`/`metrics`/`deck` configuration is structurally invalid.
#[derive(Debug)]
pub enum ConfigurationError {
    MissingField {
        section: &'static str,
        field: &'static str,
        line: Option<u32>,
    },
    InvalidValue {
        section: &'static str,
        field: &'static str,
        value: String,
        line: Option<u32>,
    },
    MissingMetricDefinition {
        metric: String,
        line: Option<u32>,
    },
    InvalidDeckBlock {
        index: usize,
        reason: String,
        line: Option<u32>,
    },
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField { section, field, line } => write!(
                f,
                "missing required field '{field}' in {section}{}",
                line_suffix(*line)
            ),
            Self::InvalidValue { section, field, value, line } => write!(
                f,
                "invalid value '{value}' for field '{field}' in {section}{}",
                line_suffix(*line)
            ),
            Self::MissingMetricDefinition { metric, line } => write!(
                f,
                "metric '{metric}' has no aggregation, column, filter, or function definition{}",
                line_suffix(*line)
            ),
            Self::InvalidDeckBlock { index, reason, line } => write!(
                f,
                "deck block #{index} is invalid: {reason}{}",
                line_suffix(*line)
            ),
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// A metric, column, or deck block refers to a name that does not exist.
#[derive(Debug)]
pub enum UnknownReferenceError {
    UnknownColumn {
        referer: String,
        column: String,
        line: Option<u32>,
    },
    UnknownMetric {
        referer: String,
        operand: String,
        line: Option<u32>,
    },
    UnknownDeckMetric {
        block: String,
        metric: String,
        line: Option<u32>,
    },
}

impl std::fmt::Display for UnknownReferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownColumn { referer, column, line } => write!(
                f,
                "metric '{referer}' references unknown column '{column}'{}",
                line_suffix(*line)
            ),
            Self::UnknownMetric { referer, operand, line } => write!(
                f,
                "metric '{referer}' references unknown metric '{operand}'{}",
                line_suffix(*line)
            ),
            Self::UnknownDeckMetric { block, metric, line } => write!(
                f,
                "deck block '{block}' references unknown metric '{metric}'{}",
                line_suffix(*line)
            ),
        }
    }
}

impl std::error::Error for UnknownReferenceError {}

/// A function metric's operand graph contains a cycle.
#[derive(Debug, Error)]
#[error("circular dependency among function metrics: {}", .cycle.join(" -> "))]
pub struct CircularDependencyError {
    /// The metrics participating in the cycle, in traversal order, with the
    /// first metric repeated at the end to make the cycle visible.
    pub cycle: Vec<String>,
}

/// The daily observation table doesn't match the shape the engine needs.
#[derive(Debug, Error)]
pub enum DataShapeError {
    #[error("daily observations are not sorted ascending by date (row {index} is {date} <= previous {previous})")]
    UnsortedDates {
        index: usize,
        date: chrono::NaiveDate,
        previous: chrono::NaiveDate,
    },

    #[error("column '{column}' referenced by metric '{metric}' does not appear in any daily observation row")]
    MissingColumn { metric: String, column: String },
}
