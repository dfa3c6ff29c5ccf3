//! Trailing six-week period builder.

use crate::aggregation::aggregate_window;
use crate::model::{AggKind, PeriodTable};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

pub const TRAILING_WEEKS: usize = 6;

/// The six week-ending dates, ascending, for a week ending at `anchor`.
pub fn week_ends(anchor: NaiveDate) -> [NaiveDate; TRAILING_WEEKS] {
    let mut ends = [anchor; TRAILING_WEEKS];
    for (i, slot) in ends.iter_mut().enumerate() {
        *slot = anchor - Duration::days(7 * (TRAILING_WEEKS - 1 - i) as i64);
    }
    ends
}

/// Build a `PeriodTable` with one row per trailing week, for every metric
/// whose per-date series is given in `base_series`.
///
/// `base_series` maps metric name to `(daily series, aggregation kind)`.
pub fn trailing_six_weeks(
    anchor: NaiveDate,
    base_series: &BTreeMap<String, (BTreeMap<NaiveDate, Option<f64>>, AggKind)>,
) -> PeriodTable {
    let ends = week_ends(anchor);
    let mut table = PeriodTable::with_dates(ends.to_vec());
    for (metric, (series, agg)) in base_series {
        let values = ends
            .iter()
            .map(|&end| aggregate_window(series, end - Duration::days(6), end, *agg))
            .collect();
        table.set_column(metric.clone(), values);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use chrono::Datelike;

    #[test]
    fn week_ends_are_all_same_weekday() {
        let anchor = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        assert_eq!(anchor.weekday(), Weekday::Sat);
        let ends = week_ends(anchor);
        for e in ends {
            assert_eq!(e.weekday(), Weekday::Sat);
        }
        assert_eq!(ends[5], anchor);
        assert_eq!((ends[5] - ends[0]).num_days(), 35);
    }
}
