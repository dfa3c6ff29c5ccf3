//! Period builders: trailing six weeks and trailing twelve months, each with
//! left-padding handled implicitly by the null-propagation rules in
//! [`crate::aggregation`].

pub mod monthly;
pub mod weekly;

pub use monthly::{trailing_twelve_months, TRAILING_MONTHS};
pub use weekly::{trailing_six_weeks, TRAILING_WEEKS};

use crate::model::PeriodTable;

/// Rename every column in `table` to carry a `PY__` prefix, matching the
/// invariant that every PY artifact exposes `PY__<metric>` rather than the
/// bare metric name.
pub fn prefix_py_columns(table: PeriodTable) -> PeriodTable {
    let mut prefixed = PeriodTable::with_dates(table.dates);
    for (name, values) in table.columns {
        prefixed.set_column(format!("PY__{name}"), values);
    }
    prefixed
}
