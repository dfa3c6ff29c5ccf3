//! The daily observation table: the engine's sole external data input.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single day's worth of numeric observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyObservation {
    pub date: NaiveDate,
    pub values: BTreeMap<String, Option<f64>>,
}

/// Daily observations, ascending by date. Duplicate dates are permitted —
/// they are collapsed per-metric by that metric's own aggregation function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationTable {
    pub rows: Vec<DailyObservation>,
}

impl ObservationTable {
    pub fn new(rows: Vec<DailyObservation>) -> Self {
        Self { rows }
    }

    /// All distinct column names that appear in at least one row.
    pub fn known_columns(&self) -> std::collections::BTreeSet<String> {
        self.rows
            .iter()
            .flat_map(|r| r.values.keys().cloned())
            .collect()
    }

    pub fn is_sorted_ascending(&self) -> Result<(), (usize, NaiveDate, NaiveDate)> {
        for (i, pair) in self.rows.windows(2).enumerate() {
            if pair[1].date < pair[0].date {
                return Err((i + 1, pair[1].date, pair[0].date));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(date: &str, values: &[(&str, Option<f64>)]) -> DailyObservation {
        DailyObservation {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            values: values.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn detects_unsorted_dates() {
        let table = ObservationTable::new(vec![
            obs("2022-01-02", &[("Sales", Some(1.0))]),
            obs("2022-01-01", &[("Sales", Some(1.0))]),
        ]);
        assert!(table.is_sorted_ascending().is_err());
    }

    #[test]
    fn duplicate_dated_rows_are_not_unsorted() {
        let table = ObservationTable::new(vec![
            obs("2022-01-01", &[("Sales", Some(1.0))]),
            obs("2022-01-01", &[("Sales", Some(2.0))]),
            obs("2022-01-02", &[("Sales", Some(3.0))]),
        ]);
        assert!(table.is_sorted_ascending().is_ok());
    }

    #[test]
    fn known_columns_is_the_union_across_rows() {
        let table = ObservationTable::new(vec![
            obs("2022-01-01", &[("Sales", Some(1.0))]),
            obs("2022-01-02", &[("Units", Some(2.0))]),
        ]);
        let cols = table.known_columns();
        assert!(cols.contains("Sales"));
        assert!(cols.contains("Units"));
    }
}
