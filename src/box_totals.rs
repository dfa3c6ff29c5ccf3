//! The box-total assembler: nine summary rows (LastWk, WOW, YOY, MTD, YOY,
//! QTD, YOY, YTD, YOY) per metric, plus the ten-row `periodSummary` table of
//! raw operands that function metrics' YoY comparisons are recomputed from.
//!
//! The box-total YoY closure is the one place function metrics don't simply
//! reuse their derived column: divide/product compare already-derived
//! CY/PY operand values directly, while sum/difference first replace null
//! operands with zero and then zero-protect the PY-side denominator so a
//! true zero reads as "N/A" rather than a bogus comparison. This asymmetry
//! is intentional — see DESIGN.md.

use crate::aggregation::{aggregate_window, daily_series, filtered_daily_series};
use crate::comparison::compare;
use crate::function_metrics::evaluation_order;
use crate::model::calendar::{
    fiscal_quarter_start, fiscal_year_start, first_day_of_month, py_monthly_anchor, py_weekly_anchor,
};
use crate::model::{AggKind, MetricDefinition, MetricsConfig, Operand, ObservationTable, Setup};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

pub const CY_WK6: usize = 0;
pub const CY_WK5: usize = 1;
pub const PY_WK6: usize = 2;
pub const PY_WK5: usize = 3;
pub const CY_MTD: usize = 4;
pub const PY_MTD: usize = 5;
pub const CY_QTD: usize = 6;
pub const PY_QTD: usize = 7;
pub const CY_YTD: usize = 8;
pub const PY_YTD: usize = 9;
pub const PERIOD_SUMMARY_ROWS: usize = 10;

pub const BOX_LAST_WK: usize = 0;
pub const BOX_WOW: usize = 1;
pub const BOX_YOY_WK: usize = 2;
pub const BOX_MTD: usize = 3;
pub const BOX_YOY_MTD: usize = 4;
pub const BOX_QTD: usize = 5;
pub const BOX_YOY_QTD: usize = 6;
pub const BOX_YTD: usize = 7;
pub const BOX_YOY_YTD: usize = 8;
pub const NUM_BOX_TOTAL_ROWS: usize = 9;

pub const BOX_AXIS_LABELS: [&str; NUM_BOX_TOTAL_ROWS] =
    ["LastWk", "WOW", "YOY", "MTD", "YOY", "QTD", "YOY", "YTD", "YOY"];

/// A single box-total cell. Division-by-zero/overflow renders as the string
/// `"N/A"`, never `null` — box totals are the one artifact where that
/// distinction is textual rather than JSON null (see [`crate::comparison`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoxCell {
    Number(f64),
    NotApplicable,
}

impl From<Option<f64>> for BoxCell {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(n) => BoxCell::Number(n),
            None => BoxCell::NotApplicable,
        }
    }
}

impl Serialize for BoxCell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            BoxCell::Number(n) => serializer.serialize_f64(*n),
            BoxCell::NotApplicable => serializer.serialize_str("N/A"),
        }
    }
}

/// Nine-row summary table, one column per metric.
#[derive(Debug, Clone)]
pub struct BoxTotals {
    pub dates: [NaiveDate; NUM_BOX_TOTAL_ROWS],
    pub values: BTreeMap<String, [BoxCell; NUM_BOX_TOTAL_ROWS]>,
}

/// Ten-row table of raw operand values, keyed by metric name (base and
/// function metrics alike — function metrics are filled in dependency
/// order by applying their operation with ordinary null propagation, the
/// same rule used everywhere outside the YoY closure).
#[derive(Debug, Clone, Default)]
pub struct PeriodSummary {
    pub rows: BTreeMap<String, [Option<f64>; PERIOD_SUMMARY_ROWS]>,
}

struct Anchors {
    cy_wk6: NaiveDate,
    cy_wk5: NaiveDate,
    py_wk6: NaiveDate,
    py_wk5: NaiveDate,
    cy_mtd: (NaiveDate, NaiveDate),
    py_mtd: (NaiveDate, NaiveDate),
    cy_qtd: (NaiveDate, NaiveDate),
    py_qtd: (NaiveDate, NaiveDate),
    cy_ytd: (NaiveDate, NaiveDate),
    py_ytd: (NaiveDate, NaiveDate),
}

fn anchors(setup: &Setup) -> Anchors {
    let cy_wk6 = setup.week_ending;
    let cy_wk5 = cy_wk6 - Duration::days(7);
    let py_wk6 = py_weekly_anchor(cy_wk6);
    let py_wk5 = py_weekly_anchor(cy_wk5);
    let py_last = py_monthly_anchor(cy_wk6);

    Anchors {
        cy_wk6,
        cy_wk5,
        py_wk6,
        py_wk5,
        cy_mtd: (first_day_of_month(cy_wk6), cy_wk6),
        py_mtd: (first_day_of_month(py_last), py_last),
        cy_qtd: (fiscal_quarter_start(cy_wk6, setup.fiscal_year_end_month), cy_wk6),
        py_qtd: (fiscal_quarter_start(py_last, setup.fiscal_year_end_month), py_last),
        cy_ytd: (fiscal_year_start(cy_wk6, setup.fiscal_year_end_month), cy_wk6),
        py_ytd: (fiscal_year_start(py_last, setup.fiscal_year_end_month), py_last),
    }
}

fn base_series_for(
    observations: &ObservationTable,
    definition: &MetricDefinition,
) -> (BTreeMap<NaiveDate, Option<f64>>, AggKind) {
    match definition {
        MetricDefinition::Column { column, agg } => (daily_series(&observations.rows, column, *agg), *agg),
        MetricDefinition::Filter { base_column, predicate, agg } => (
            filtered_daily_series(&observations.rows, base_column, predicate, *agg),
            *agg,
        ),
        MetricDefinition::Function { .. } => unreachable!("base_series_for called on a function metric"),
    }
}

/// Build `periodSummary` for every metric (base metrics from daily
/// observations, function metrics by dependency order).
pub fn build_period_summary(
    observations: &ObservationTable,
    metrics: &MetricsConfig,
    setup: &Setup,
) -> PeriodSummary {
    let a = anchors(setup);
    let mut summary = PeriodSummary::default();

    for (name, metric) in metrics {
        if metric.definition.is_function() {
            continue;
        }
        let (series, agg) = base_series_for(observations, &metric.definition);
        let mut row = [None; PERIOD_SUMMARY_ROWS];
        row[CY_WK6] = aggregate_window(&series, a.cy_wk6 - Duration::days(6), a.cy_wk6, agg);
        row[CY_WK5] = aggregate_window(&series, a.cy_wk5 - Duration::days(6), a.cy_wk5, agg);
        row[PY_WK6] = aggregate_window(&series, a.py_wk6 - Duration::days(6), a.py_wk6, agg);
        row[PY_WK5] = aggregate_window(&series, a.py_wk5 - Duration::days(6), a.py_wk5, agg);
        row[CY_MTD] = aggregate_window(&series, a.cy_mtd.0, a.cy_mtd.1, agg);
        row[PY_MTD] = aggregate_window(&series, a.py_mtd.0, a.py_mtd.1, agg);
        row[CY_QTD] = aggregate_window(&series, a.cy_qtd.0, a.cy_qtd.1, agg);
        row[PY_QTD] = aggregate_window(&series, a.py_qtd.0, a.py_qtd.1, agg);
        row[CY_YTD] = aggregate_window(&series, a.cy_ytd.0, a.cy_ytd.1, agg);
        row[PY_YTD] = aggregate_window(&series, a.py_ytd.0, a.py_ytd.1, agg);
        summary.rows.insert(name.clone(), row);
    }

    if let Ok(order) = evaluation_order(metrics) {
        for name in &order {
            let MetricDefinition::Function { op, operands } = &metrics[name].definition else {
                continue;
            };
            let mut row = [None; PERIOD_SUMMARY_ROWS];
            for (idx, slot) in row.iter_mut().enumerate() {
                let values: Vec<Option<f64>> = operands
                    .iter()
                    .map(|Operand::Metric(n)| summary.rows.get(n).and_then(|r| r[idx]))
                    .collect();
                *slot = op.apply_nullable(&values);
            }
            summary.rows.insert(name.clone(), row);
        }
    }

    summary
}

fn yoy_closure(
    summary: &PeriodSummary,
    metrics: &MetricsConfig,
    name: &str,
    cy_idx: usize,
    py_idx: usize,
) -> Option<f64> {
    let metric = &metrics[name];
    let row = summary.rows.get(name)?;
    match &metric.definition {
        MetricDefinition::Function { op, operands } if !op.closure_uses_raw_operands() => {
            // sum/difference: substitute null operands with zero, then
            // zero-protect the PY-side result.
            let cy_values: Vec<f64> = operands
                .iter()
                .map(|Operand::Metric(n)| summary.rows.get(n).and_then(|r| r[cy_idx]).unwrap_or(0.0))
                .collect();
            let py_values: Vec<f64> = operands
                .iter()
                .map(|Operand::Metric(n)| summary.rows.get(n).and_then(|r| r[py_idx]).unwrap_or(0.0))
                .collect();
            let cy_value = op.apply(&cy_values);
            let py_value = op.apply(&py_values);
            let py_value = if py_value == 0.0 { None } else { Some(py_value) };
            compare(Some(cy_value), py_value, metric.comparison_method, true)
        }
        _ => compare(row[cy_idx], row[py_idx], metric.comparison_method, true),
    }
}

fn wow_value(summary: &PeriodSummary, metrics: &MetricsConfig, name: &str) -> Option<f64> {
    let metric = &metrics[name];
    let row = summary.rows.get(name)?;
    compare(row[CY_WK6], row[CY_WK5], metric.comparison_method, true)
}

/// Assemble cyBoxTotals, pyBoxTotals, and periodSummary in one pass.
pub fn build_box_totals(
    observations: &ObservationTable,
    metrics: &MetricsConfig,
    setup: &Setup,
) -> (BoxTotals, BoxTotals, PeriodSummary) {
    let a = anchors(setup);
    let summary = build_period_summary(observations, metrics, setup);

    let cy_dates = [
        a.cy_wk6, a.cy_wk6, a.cy_wk6, a.cy_mtd.1, a.cy_mtd.1, a.cy_qtd.1, a.cy_qtd.1, a.cy_ytd.1, a.cy_ytd.1,
    ];
    let py_dates = [
        a.py_wk6, a.py_wk6, a.py_wk6, a.py_mtd.1, a.py_mtd.1, a.py_qtd.1, a.py_qtd.1, a.py_ytd.1, a.py_ytd.1,
    ];

    let mut cy = BoxTotals { dates: cy_dates, values: BTreeMap::new() };
    let mut py = BoxTotals { dates: py_dates, values: BTreeMap::new() };

    for name in metrics.keys() {
        let Some(row) = summary.rows.get(name) else { continue };

        let mut cy_row = [BoxCell::NotApplicable; NUM_BOX_TOTAL_ROWS];
        cy_row[BOX_LAST_WK] = row[CY_WK6].into();
        cy_row[BOX_MTD] = row[CY_MTD].into();
        cy_row[BOX_QTD] = row[CY_QTD].into();
        cy_row[BOX_YTD] = row[CY_YTD].into();
        cy_row[BOX_WOW] = wow_value(&summary, metrics, name).into();
        cy_row[BOX_YOY_WK] = yoy_closure(&summary, metrics, name, CY_WK6, PY_WK6).into();
        cy_row[BOX_YOY_MTD] = yoy_closure(&summary, metrics, name, CY_MTD, PY_MTD).into();
        cy_row[BOX_YOY_QTD] = yoy_closure(&summary, metrics, name, CY_QTD, PY_QTD).into();
        cy_row[BOX_YOY_YTD] = yoy_closure(&summary, metrics, name, CY_YTD, PY_YTD).into();
        cy.values.insert(name.clone(), cy_row);

        let mut py_row = [BoxCell::NotApplicable; NUM_BOX_TOTAL_ROWS];
        py_row[BOX_LAST_WK] = row[PY_WK6].into();
        py_row[BOX_MTD] = row[PY_MTD].into();
        py_row[BOX_QTD] = row[PY_QTD].into();
        py_row[BOX_YTD] = row[PY_YTD].into();
        py.values.insert(name.clone(), py_row);
    }

    (cy, py, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ComparisonMethod, DailyObservation, Metric};
    use crate::model::FunctionOp;

    fn daily(date: &str, values: &[(&str, f64)]) -> DailyObservation {
        DailyObservation {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            values: values.iter().map(|(k, v)| (k.to_string(), Some(*v))).collect(),
        }
    }

    fn setup(week_ending: &str) -> Setup {
        Setup {
            week_ending: NaiveDate::parse_from_str(week_ending, "%Y-%m-%d").unwrap(),
            ..Setup::default()
        }
    }

    #[test]
    fn function_metric_yoy_closure_uses_raw_operands() {
        // Price = Revenue / Units. CY MTD 1000/100, PY MTD 500/50 -> YoY 0,
        // computed from the operands, not from a derived box-total column.
        let week_ending = "2022-01-31";
        let mut rows = Vec::new();
        for day in 1..=31 {
            rows.push(daily(
                &format!("2022-01-{day:02}"),
                &[("Revenue", 1000.0 / 31.0), ("Units", 100.0 / 31.0)],
            ));
        }
        for day in 1..=31 {
            rows.push(daily(
                &format!("2021-01-{day:02}"),
                &[("Revenue", 500.0 / 31.0), ("Units", 50.0 / 31.0)],
            ));
        }
        let observations = ObservationTable::new(rows);

        let mut metrics = MetricsConfig::new();
        metrics.insert(
            "Revenue".into(),
            Metric {
                name: "Revenue".into(),
                definition: MetricDefinition::Column { column: "Revenue".into(), agg: AggKind::Sum },
                comparison_method: ComparisonMethod::PctChange,
                line: None,
            },
        );
        metrics.insert(
            "Units".into(),
            Metric {
                name: "Units".into(),
                definition: MetricDefinition::Column { column: "Units".into(), agg: AggKind::Sum },
                comparison_method: ComparisonMethod::PctChange,
                line: None,
            },
        );
        metrics.insert(
            "Price".into(),
            Metric {
                name: "Price".into(),
                definition: MetricDefinition::Function {
                    op: FunctionOp::Divide,
                    operands: vec![Operand::Metric("Revenue".into()), Operand::Metric("Units".into())],
                },
                comparison_method: ComparisonMethod::PctChange,
                line: None,
            },
        );

        let (cy, _py, _summary) = build_box_totals(&observations, &metrics, &setup(week_ending));
        let price_row = cy.values["Price"];
        match price_row[BOX_YOY_MTD] {
            BoxCell::Number(v) => assert!(v.abs() < 1e-6),
            BoxCell::NotApplicable => panic!("expected a numeric YoY value"),
        }
    }

    #[test]
    fn py_box_totals_comparison_rows_are_not_applicable() {
        let week_ending = "2022-01-08";
        let rows = vec![daily("2022-01-08", &[("Sales", 10.0)])];
        let observations = ObservationTable::new(rows);
        let mut metrics = MetricsConfig::new();
        metrics.insert(
            "Sales".into(),
            Metric {
                name: "Sales".into(),
                definition: MetricDefinition::Column { column: "Sales".into(), agg: AggKind::Sum },
                comparison_method: ComparisonMethod::PctChange,
                line: None,
            },
        );
        let (_cy, py, _summary) = build_box_totals(&observations, &metrics, &setup(week_ending));
        for idx in [BOX_WOW, BOX_YOY_WK, BOX_YOY_MTD, BOX_YOY_QTD, BOX_YOY_YTD] {
            assert_eq!(py.values["Sales"][idx], BoxCell::NotApplicable);
        }
    }
}
