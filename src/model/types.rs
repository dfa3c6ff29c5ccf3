//! Core value types shared across the metric and deck models.

use serde::{Deserialize, Serialize};

/// How a base metric collapses multiple daily values into one.
///
/// `Sum` propagates null (skipna=false): if any day in the window is null,
/// the aggregated value is null. `First`/`Last` pick the first/last
/// non-null value in calendar order. `Mean` ignores nulls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggKind {
    Sum,
    First,
    Last,
    Mean,
}

/// The operation a function metric applies across its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionOp {
    Sum,
    Difference,
    Product,
    Divide,
}

impl FunctionOp {
    /// Apply this operation to its operand values. `sum` is N-ary and folds
    /// the whole slice; `difference`/`product`/`divide` are binary and use
    /// only the first two operands (the metric model enforces the right
    /// arity when a function metric is constructed).
    pub fn apply(self, operands: &[f64]) -> f64 {
        match self {
            FunctionOp::Sum => operands.iter().sum(),
            FunctionOp::Difference => operands[0] - operands[1],
            FunctionOp::Product => operands[0] * operands[1],
            FunctionOp::Divide => operands[0] / operands[1],
        }
    }

    /// Null-propagation rule used when combining a function metric's operand
    /// values across the six period artifacts (not the box-total YoY
    /// closure path, which has its own rules — see [`crate::box_totals`]).
    /// Any null operand makes the whole result null.
    pub fn apply_nullable(self, operands: &[Option<f64>]) -> Option<f64> {
        let mut values = Vec::with_capacity(operands.len());
        for operand in operands {
            values.push((*operand)?);
        }
        Some(self.apply(&values))
    }

    /// True for operations whose box-total YoY comparison is recomputed
    /// directly from raw operands (divide/product), rather than from
    /// null-substituted operands (sum/difference). See the box-total YoY
    /// closure rule.
    pub fn closure_uses_raw_operands(self) -> bool {
        matches!(self, FunctionOp::Divide | FunctionOp::Product)
    }
}

/// How a metric's current-vs-prior comparison is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMethod {
    /// `(cy - py) * 10_000`
    Bps,
    /// `(cy / py - 1) * 100`
    PctChange,
}

impl Default for ComparisonMethod {
    fn default() -> Self {
        ComparisonMethod::PctChange
    }
}

/// Scale label attached to a chart block's box totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoxTotalScale {
    #[serde(rename = "%")]
    Percent,
    #[serde(rename = "bps")]
    Bps,
}

/// Whether a 6-12 chart's monthly half labels every month or only quarter
/// boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XAxisMonthlyDisplay {
    AllMonths,
    QuarterBoundaries,
}

impl Default for XAxisMonthlyDisplay {
    fn default() -> Self {
        XAxisMonthlyDisplay::AllMonths
    }
}
