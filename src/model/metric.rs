//! Metric definitions: the business-logic vocabulary of a WBR deck.

use super::expr::Expr;
use super::types::{AggKind, ComparisonMethod, FunctionOp};
use std::collections::BTreeMap;

/// What an operand of a function metric refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Another metric by name (base or function).
    Metric(String),
}

/// How a metric's value is computed from daily observations or other
/// metrics.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricDefinition {
    /// Extract a column directly, collapsing same-date duplicates with
    /// `agg`.
    Column { column: String, agg: AggKind },
    /// Extract `base_column` from rows matching `predicate`, collapsing
    /// same-date duplicates with `agg`.
    Filter {
        base_column: String,
        predicate: Expr,
        agg: AggKind,
    },
    /// Derive a value from other metrics. `sum` is N-ary (two or more
    /// operands); `difference`/`product`/`divide` are binary (exactly two).
    Function {
        op: FunctionOp,
        operands: Vec<Operand>,
    },
}

impl MetricDefinition {
    /// Metric names this definition depends on (empty for `Column`/`Filter`).
    pub fn metric_dependencies(&self) -> Vec<&str> {
        match self {
            MetricDefinition::Function { operands, .. } => operands
                .iter()
                .map(|Operand::Metric(name)| name.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self, MetricDefinition::Function { .. })
    }
}

/// A single named metric: its definition plus presentation metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub definition: MetricDefinition,
    pub comparison_method: ComparisonMethod,
    /// Source line, carried through from configuration for diagnostics.
    pub line: Option<u32>,
}

/// The full metric vocabulary, keyed by name. A `BTreeMap` keeps dependency
/// traversal and error reporting deterministic regardless of input order.
pub type MetricsConfig = BTreeMap<String, Metric>;
