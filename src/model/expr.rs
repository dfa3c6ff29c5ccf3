//! Predicate expression AST for filter metrics.
//!
//! This is a closed grammar, not a general expression engine: comparisons
//! and boolean connectives over columns and literals, nothing else.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Column(String),
    Literal(Literal),
    Compare {
        op: CompareOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Not(Box<Expr>),
}

/// A value extracted from a daily observation row for predicate evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowValue<'a> {
    Number(Option<f64>),
    Text(&'a str),
}

impl Expr {
    /// Column names this predicate reads from a daily observation row.
    pub fn columns(&self, out: &mut Vec<String>) {
        match self {
            Expr::Column(name) => out.push(name.clone()),
            Expr::Literal(_) => {}
            Expr::Compare { lhs, rhs, .. } | Expr::Logical { lhs, rhs, .. } => {
                lhs.columns(out);
                rhs.columns(out);
            }
            Expr::Not(inner) => inner.columns(out),
        }
    }

    /// Evaluate this predicate against a row, given a column lookup. Any
    /// comparison against a missing/null numeric column evaluates to
    /// `false` rather than erroring — predicate evaluation never fails at
    /// runtime once the metric has been validated.
    pub fn evaluate<'a>(&self, row: &dyn Fn(&str) -> Option<RowValue<'a>>) -> bool {
        match eval_value(self, row) {
            Some(Value::Bool(b)) => b,
            _ => false,
        }
    }
}

enum Value {
    Bool(bool),
    Number(f64),
    Text(String),
}

fn eval_value<'a>(expr: &Expr, row: &dyn Fn(&str) -> Option<RowValue<'a>>) -> Option<Value> {
    match expr {
        Expr::Literal(Literal::Bool(b)) => Some(Value::Bool(*b)),
        Expr::Literal(Literal::Int(i)) => Some(Value::Number(*i as f64)),
        Expr::Literal(Literal::Float(f)) => Some(Value::Number(*f)),
        Expr::Literal(Literal::String(s)) => Some(Value::Text(s.clone())),
        Expr::Column(name) => match row(name)? {
            RowValue::Number(Some(n)) => Some(Value::Number(n)),
            RowValue::Number(None) => None,
            RowValue::Text(s) => Some(Value::Text(s.to_string())),
        },
        Expr::Not(inner) => match eval_value(inner, row)? {
            Value::Bool(b) => Some(Value::Bool(!b)),
            _ => None,
        },
        Expr::Logical { op, lhs, rhs } => {
            let l = match eval_value(lhs, row) {
                Some(Value::Bool(b)) => b,
                _ => false,
            };
            let r = match eval_value(rhs, row) {
                Some(Value::Bool(b)) => b,
                _ => false,
            };
            Some(Value::Bool(match op {
                LogicalOp::And => l && r,
                LogicalOp::Or => l || r,
            }))
        }
        Expr::Compare { op, lhs, rhs } => {
            let l = eval_value(lhs, row)?;
            let r = eval_value(rhs, row)?;
            let ordering = match (l, r) {
                (Value::Number(a), Value::Number(b)) => a.partial_cmp(&b)?,
                (Value::Text(a), Value::Text(b)) => a.cmp(&b),
                (Value::Bool(a), Value::Bool(b)) => a.cmp(&b),
                _ => return None,
            };
            Some(Value::Bool(match op {
                CompareOp::Eq => ordering == std::cmp::Ordering::Equal,
                CompareOp::Ne => ordering != std::cmp::Ordering::Equal,
                CompareOp::Lt => ordering == std::cmp::Ordering::Less,
                CompareOp::Le => ordering != std::cmp::Ordering::Greater,
                CompareOp::Gt => ordering == std::cmp::Ordering::Greater,
                CompareOp::Ge => ordering != std::cmp::Ordering::Less,
            }))
        }
    }
}
