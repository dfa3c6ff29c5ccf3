//! Aggregation primitives shared by daily-duplicate collapsing and period
//! (weekly/monthly/box-total) roll-ups.
//!
//! The same [`AggKind`] is applied at both stages, per metric — there is no
//! separate "resample" aggregation function.

use crate::model::expr::{Expr, RowValue};
use crate::model::{AggKind, DailyObservation};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Collapse a (possibly duplicate-dated) set of daily observations into one
/// value per date for a single base column, applying `agg` to same-date
/// duplicates. Dates entirely absent from `rows` are simply absent from the
/// result (distinct from a present-but-null day).
pub fn daily_series(rows: &[DailyObservation], column: &str, agg: AggKind) -> BTreeMap<NaiveDate, Option<f64>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    for row in rows {
        let value = row.values.get(column).copied().unwrap_or(None);
        by_date.entry(row.date).or_default().push(value);
    }
    by_date
        .into_iter()
        .map(|(date, values)| (date, apply(agg, &values)))
        .collect()
}

/// Like [`daily_series`], but only over rows matching `predicate`.
pub fn filtered_daily_series(
    rows: &[DailyObservation],
    base_column: &str,
    predicate: &Expr,
    agg: AggKind,
) -> BTreeMap<NaiveDate, Option<f64>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    for row in rows {
        let lookup = |name: &str| -> Option<RowValue<'_>> {
            row.values.get(name).map(|v| RowValue::Number(*v))
        };
        if predicate.evaluate(&lookup) {
            let value = row.values.get(base_column).copied().unwrap_or(None);
            by_date.entry(row.date).or_default().push(value);
        }
    }
    by_date
        .into_iter()
        .map(|(date, values)| (date, apply(agg, &values)))
        .collect()
}

/// Apply an aggregation kind to a list of same-date (or same-window) values.
/// `sum` propagates null (skipna=false); `first`/`last` pick the first/last
/// non-null entry in the given order; `mean` ignores null entries.
pub fn apply(agg: AggKind, values: &[Option<f64>]) -> Option<f64> {
    match agg {
        AggKind::Sum => {
            if values.is_empty() {
                return None;
            }
            values.iter().try_fold(0.0, |acc, v| v.map(|x| acc + x))
        }
        AggKind::First => values.iter().copied().flatten().next(),
        AggKind::Last => values.iter().rev().copied().flatten().next(),
        AggKind::Mean => {
            let present: Vec<f64> = values.iter().copied().flatten().collect();
            if present.is_empty() {
                None
            } else {
                Some(present.iter().sum::<f64>() / present.len() as f64)
            }
        }
    }
}

/// Aggregate a per-date series over an inclusive calendar-day window. A day
/// within the window that has no entry in `series` is treated as null —
/// identical to a day present with a null value.
pub fn aggregate_window(
    series: &BTreeMap<NaiveDate, Option<f64>>,
    start: NaiveDate,
    end: NaiveDate,
    agg: AggKind,
) -> Option<f64> {
    let mut day = start;
    let mut values = Vec::new();
    while day <= end {
        values.push(series.get(&day).copied().unwrap_or(None));
        day += chrono::Duration::days(1);
    }
    apply(agg, &values)
}
