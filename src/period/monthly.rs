//! Trailing twelve-month period builder, with partial-month and
//! fiscal-year-end extension.

use crate::aggregation::aggregate_window;
use crate::model::calendar::{add_months, fiscal_year_end, first_day_of_month, is_last_day_of_month, last_day_of_month, Month};
use crate::model::{AggKind, PeriodTable};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub const TRAILING_MONTHS: usize = 12;

/// Month-end dates for the 12 trailing months, ascending, ending at
/// `anchor`'s own month. The last slot is `anchor` itself when `anchor`
/// isn't a month-end (the partial current month).
fn month_slots(anchor: NaiveDate) -> Vec<NaiveDate> {
    (0..TRAILING_MONTHS)
        .map(|i| {
            let offset = (TRAILING_MONTHS - 1 - i) as i32;
            let month_date = add_months(anchor, -offset);
            if offset == 0 {
                anchor
            } else {
                last_day_of_month(month_date)
            }
        })
        .collect()
}

/// Window `[start, end]` to aggregate for a given month slot. Historical
/// months use the full calendar month; the final (possibly partial) slot
/// uses `[first_day_of_month(slot), slot]`.
fn window_for_slot(slot: NaiveDate, is_current: bool) -> (NaiveDate, NaiveDate) {
    if is_current {
        (first_day_of_month(slot), slot)
    } else {
        (first_day_of_month(slot), last_day_of_month(slot))
    }
}

/// Aggregate one month slot, applying the count-match guard to the current
/// (possibly partial) slot only: if the window has any day missing from
/// `series`, the slot is null regardless of aggregation kind.
fn aggregate_slot(
    series: &BTreeMap<NaiveDate, Option<f64>>,
    slot: NaiveDate,
    is_current: bool,
    agg: AggKind,
) -> Option<f64> {
    let (start, end) = window_for_slot(slot, is_current);
    if is_current {
        let mut day = start;
        let mut present = 0i64;
        let mut total = 0i64;
        while day <= end {
            total += 1;
            if series.get(&day).copied().flatten().is_some() {
                present += 1;
            }
            day += chrono::Duration::days(1);
        }
        if present != total {
            return None;
        }
    }
    aggregate_window(series, start, end, agg)
}

/// Build a `PeriodTable` with one row per trailing month (12, plus any
/// fiscal-year projection rows), for every metric in `base_series`.
pub fn trailing_twelve_months(
    anchor: NaiveDate,
    fiscal_year_end_month: Month,
    base_series: &BTreeMap<String, (BTreeMap<NaiveDate, Option<f64>>, AggKind)>,
) -> PeriodTable {
    let slots = month_slots(anchor);
    let last_slot = *slots.last().unwrap();
    let last_is_partial = !is_last_day_of_month(anchor);

    let fy_end = fiscal_year_end(last_slot, fiscal_year_end_month);
    let mut projected = Vec::new();
    if fy_end > last_slot {
        let mut month = add_months(last_slot, 1);
        loop {
            let month_end = last_day_of_month(month);
            projected.push(month_end);
            if month_end >= fy_end {
                break;
            }
            month = add_months(month, 1);
        }
    }

    let mut dates = slots.clone();
    dates.extend(projected.iter().copied());
    let mut table = PeriodTable::with_dates(dates);

    for (metric, (series, agg)) in base_series {
        let mut values: Vec<Option<f64>> = slots
            .iter()
            .enumerate()
            .map(|(i, &slot)| {
                let is_last = i == slots.len() - 1;
                aggregate_slot(series, slot, is_last && last_is_partial, *agg)
            })
            .collect();

        for &month_end in &projected {
            let (start, end) = window_for_slot(month_end, false);
            let value = aggregate_window(series, start, end, *agg);
            // Projected future months: a computed zero is indistinguishable
            // from "no data yet" and is displayed as null, not 0.
            values.push(match value {
                Some(v) if v == 0.0 => None,
                other => other,
            });
        }

        table.set_column(metric.clone(), values);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_series(pairs: &[(&str, f64)]) -> BTreeMap<NaiveDate, Option<f64>> {
        pairs
            .iter()
            .map(|(d, v)| (NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(), Some(*v)))
            .collect()
    }

    #[test]
    fn twelve_months_ends_at_anchor_month() {
        let anchor = NaiveDate::from_ymd_opt(2022, 1, 31).unwrap();
        let slots = month_slots(anchor);
        assert_eq!(slots.len(), 12);
        assert_eq!(*slots.last().unwrap(), anchor);
        assert_eq!(slots[0], NaiveDate::from_ymd_opt(2021, 2, 28).unwrap());
    }

    #[test]
    fn fiscal_year_extension_matches_scenario() {
        // MAR fiscal end, week_ending = 2022-01-15 -> 14 months Feb2021..Mar2022,
        // with Feb2022/Mar2022 projected (zero -> null).
        let anchor = NaiveDate::from_ymd_opt(2022, 1, 15).unwrap();
        let mut series = BTreeMap::new();
        series.insert(
            "Sales".to_string(),
            (make_series(&[("2022-01-01", 1.0), ("2022-01-15", 2.0)]), AggKind::Sum),
        );
        let table = trailing_twelve_months(anchor, Month::March, &series);
        assert_eq!(table.len(), 14);
        assert_eq!(table.dates[0], NaiveDate::from_ymd_opt(2021, 2, 28).unwrap());
        assert_eq!(*table.dates.last().unwrap(), NaiveDate::from_ymd_opt(2022, 3, 31).unwrap());
        // Feb and Mar 2022 have no data at all -> null, not zero.
        assert_eq!(table.value_at("Sales", 12), None);
        assert_eq!(table.value_at("Sales", 13), None);
    }

    #[test]
    fn partial_month_count_match_guard() {
        let anchor = NaiveDate::from_ymd_opt(2022, 1, 15).unwrap();
        // Missing 2022-01-10: the window isn't fully covered, so even
        // `first` (which normally tolerates gaps) becomes null.
        let series = make_series(&[("2022-01-01", 1.0), ("2022-01-15", 2.0)]);
        let (start, end) = window_for_slot(anchor, true);
        assert_eq!(start, NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
        assert_eq!(end, anchor);
        let value = aggregate_slot(&series, anchor, true, AggKind::First);
        assert_eq!(value, None);
    }
}
