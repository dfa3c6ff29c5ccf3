//! Function-metric dependency resolution and evaluation.
//!
//! Function metrics (sum/difference/product/divide of two other metrics) are
//! evaluated in dependency order via a DFS with three-color marking —
//! white (unvisited), gray (on the current path), black (finished) — so a
//! revisit of a gray node raises [`CircularDependencyError`] before any
//! partial output is produced.

use crate::error::CircularDependencyError;
use crate::model::{MetricDefinition, MetricsConfig, Operand, PeriodTable};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Topologically order the function metrics in `metrics` so each one's
/// operands are evaluated before it. Base metrics (`Column`/`Filter`) are
/// omitted — callers are expected to have already populated their columns.
pub fn evaluation_order(metrics: &MetricsConfig) -> Result<Vec<String>, CircularDependencyError> {
    let mut color: std::collections::HashMap<&str, Color> =
        metrics.keys().map(|k| (k.as_str(), Color::White)).collect();
    let mut order = Vec::new();
    let mut path = Vec::new();

    for name in metrics.keys() {
        visit(name, metrics, &mut color, &mut path, &mut order)?;
    }

    Ok(order
        .into_iter()
        .filter(|n| metrics[n].definition.is_function())
        .collect())
}

fn visit<'a>(
    name: &'a str,
    metrics: &'a MetricsConfig,
    color: &mut std::collections::HashMap<&'a str, Color>,
    path: &mut Vec<String>,
    order: &mut Vec<String>,
) -> Result<(), CircularDependencyError> {
    match color.get(name).copied() {
        Some(Color::Black) | None => return Ok(()),
        Some(Color::Gray) => {
            let cycle_start = path.iter().position(|n| n == name).unwrap_or(0);
            let mut cycle = path[cycle_start..].to_vec();
            cycle.push(name.to_string());
            return Err(CircularDependencyError { cycle });
        }
        Some(Color::White) => {}
    }

    color.insert(name, Color::Gray);
    path.push(name.to_string());

    if let Some(metric) = metrics.get(name) {
        for dep in metric.definition.metric_dependencies() {
            visit(dep, metrics, color, path, order)?;
        }
    }

    path.pop();
    color.insert(name, Color::Black);
    order.push(name.to_string());
    Ok(())
}

/// Evaluate every function metric in `order` against `table`, applying the
/// same operation identically across CY/PY weekly/monthly/box-total
/// artifacts. `py` metrics are looked up with a `PY__` prefix when
/// `py_columns` is set.
pub fn evaluate_into(table: &mut PeriodTable, metrics: &MetricsConfig, order: &[String]) {
    for name in order {
        let metric = &metrics[name];
        let MetricDefinition::Function { op, operands } = &metric.definition else {
            continue;
        };
        let len = table.len();
        let values: Vec<Option<f64>> = (0..len)
            .map(|i| {
                let operand_values: Vec<Option<f64>> = operands
                    .iter()
                    .map(|Operand::Metric(name)| table.value_at(name, i))
                    .collect();
                op.apply_nullable(&operand_values)
            })
            .collect();
        table.set_column(name.clone(), values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AggKind, ComparisonMethod, Metric};
    use crate::model::FunctionOp;
    use chrono::NaiveDate;

    fn base_metric(name: &str) -> Metric {
        Metric {
            name: name.to_string(),
            definition: MetricDefinition::Column {
                column: name.to_string(),
                agg: AggKind::Sum,
            },
            comparison_method: ComparisonMethod::PctChange,
            line: None,
        }
    }

    fn fn_metric(name: &str, op: FunctionOp, operands: &[&str]) -> Metric {
        Metric {
            name: name.to_string(),
            definition: MetricDefinition::Function {
                op,
                operands: operands.iter().map(|o| Operand::Metric(o.to_string())).collect(),
            },
            comparison_method: ComparisonMethod::PctChange,
            line: None,
        }
    }

    #[test]
    fn detects_circular_dependency() {
        let mut metrics = MetricsConfig::new();
        metrics.insert("A".into(), fn_metric("A", FunctionOp::Sum, &["B", "C"]));
        metrics.insert("B".into(), fn_metric("B", FunctionOp::Sum, &["A", "D"]));
        metrics.insert("C".into(), base_metric("C"));
        metrics.insert("D".into(), base_metric("D"));

        let err = evaluation_order(&metrics).unwrap_err();
        assert!(err.cycle.contains(&"A".to_string()));
        assert!(err.cycle.contains(&"B".to_string()));
    }

    #[test]
    fn evaluates_in_dependency_order() {
        let mut metrics = MetricsConfig::new();
        metrics.insert("Revenue".into(), base_metric("Revenue"));
        metrics.insert("Units".into(), base_metric("Units"));
        metrics.insert(
            "Price".into(),
            fn_metric("Price", FunctionOp::Divide, &["Revenue", "Units"]),
        );

        let order = evaluation_order(&metrics).unwrap();
        assert_eq!(order, vec!["Price".to_string()]);

        let mut table = PeriodTable::with_dates(vec![NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()]);
        table.set_column("Revenue", vec![Some(1000.0)]);
        table.set_column("Units", vec![Some(100.0)]);
        evaluate_into(&mut table, &metrics, &order);
        assert_eq!(table.value_at("Price", 0), Some(10.0));
    }

    #[test]
    fn re_evaluating_function_metrics_is_a_no_op() {
        let mut metrics = MetricsConfig::new();
        metrics.insert("Revenue".into(), base_metric("Revenue"));
        metrics.insert("Units".into(), base_metric("Units"));
        metrics.insert(
            "Price".into(),
            fn_metric("Price", FunctionOp::Divide, &["Revenue", "Units"]),
        );
        let order = evaluation_order(&metrics).unwrap();

        let mut table = PeriodTable::with_dates(vec![NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()]);
        table.set_column("Revenue", vec![Some(1000.0)]);
        table.set_column("Units", vec![Some(100.0)]);
        evaluate_into(&mut table, &metrics, &order);
        let first_pass = table.value_at("Price", 0);
        evaluate_into(&mut table, &metrics, &order);
        assert_eq!(table.value_at("Price", 0), first_pass);
    }
}
