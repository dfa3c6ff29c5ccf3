//! `PeriodTable`: the columnar shape shared by all six period artifacts
//! (cyWeekly, pyWeekly, cyMonthly, pyMonthly, cyBoxTotals, pyBoxTotals).

use chrono::NaiveDate;
use std::collections::BTreeMap;

/// A Date column plus named numeric columns, all the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodTable {
    pub dates: Vec<NaiveDate>,
    pub columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl PeriodTable {
    pub fn with_dates(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.dates.len());
        self.columns.insert(name.into(), values);
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    pub fn value_at(&self, name: &str, index: usize) -> Option<f64> {
        self.columns.get(name).and_then(|v| v.get(index)).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_count_matches_dates() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 1, 8).unwrap(),
        ];
        let mut table = PeriodTable::with_dates(dates);
        table.set_column("Sales", vec![Some(1.0), None]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value_at("Sales", 1), None);
    }
}
