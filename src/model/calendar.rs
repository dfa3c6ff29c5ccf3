//! Calendar arithmetic: fiscal boundaries, month-preserving offsets, and the
//! two distinct prior-year anchors.
//!
//! Weekly and monthly prior-year offsets are deliberately different and must
//! never be unified: the weekly anchor moves back exactly 364 days to keep
//! weekday alignment, while the monthly anchor moves back one calendar year
//! (month-preserving, day clamped).

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar month, independent of year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub fn from_number(n: u32) -> Option<Self> {
        use Month::*;
        Some(match n {
            1 => January,
            2 => February,
            3 => March,
            4 => April,
            5 => May,
            6 => June,
            7 => July,
            8 => August,
            9 => September,
            10 => October,
            11 => November,
            12 => December,
            _ => return None,
        })
    }

    pub fn number(self) -> u32 {
        use Month::*;
        match self {
            January => 1,
            February => 2,
            March => 3,
            April => 4,
            May => 5,
            June => 6,
            July => 7,
            August => 8,
            September => 9,
            October => 10,
            November => 11,
            December => 12,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "JAN" | "JANUARY" => Some(Month::January),
            "FEB" | "FEBRUARY" => Some(Month::February),
            "MAR" | "MARCH" => Some(Month::March),
            "APR" | "APRIL" => Some(Month::April),
            "MAY" => Some(Month::May),
            "JUN" | "JUNE" => Some(Month::June),
            "JUL" | "JULY" => Some(Month::July),
            "AUG" | "AUGUST" => Some(Month::August),
            "SEP" | "SEPT" | "SEPTEMBER" => Some(Month::September),
            "OCT" | "OCTOBER" => Some(Month::October),
            "NOV" | "NOVEMBER" => Some(Month::November),
            "DEC" | "DECEMBER" => Some(Month::December),
            _ => None,
        }
    }

    /// Three-letter abbreviation, as used on the chart's x-axis.
    pub fn abbrev(self) -> &'static str {
        use Month::*;
        match self {
            January => "Jan",
            February => "Feb",
            March => "Mar",
            April => "Apr",
            May => "May",
            June => "Jun",
            July => "Jul",
            August => "Aug",
            September => "Sep",
            October => "Oct",
            November => "Nov",
            December => "Dec",
        }
    }
}

/// Number of exact days that separate the current-year and prior-year
/// weekly anchors. Preserves weekday alignment without drifting across leap
/// years.
pub const PY_WEEKLY_OFFSET_DAYS: i64 = 364;

/// Last calendar day of the month containing `date`.
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (y, m) = (date.year(), date.month());
    let first_of_next = if m == 12 {
        NaiveDate::from_ymd_opt(y + 1, 1, 1).unwrap()
    } else {
        NaiveDate::from_ymd_opt(y, m + 1, 1).unwrap()
    };
    first_of_next - Duration::days(1)
}

/// True when `date` is the last day of its month.
pub fn is_last_day_of_month(date: NaiveDate) -> bool {
    date == last_day_of_month(date)
}

/// First calendar day of the month containing `date`.
pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap()
}

/// Shift `date` by `delta` months, month-preserving with the day clamped to
/// the destination month's length (relativedelta semantics).
pub fn add_months(date: NaiveDate, delta: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month() as i32 - 1 + delta;
    let year = total.div_euclid(12);
    let month = (total.rem_euclid(12) + 1) as u32;
    let last_day = last_day_of_month(NaiveDate::from_ymd_opt(year, month, 1).unwrap()).day();
    NaiveDate::from_ymd_opt(year, month, date.day().min(last_day)).unwrap()
}

/// Prior-year weekly anchor: exactly 364 days back. Must not be unified with
/// [`py_monthly_anchor`].
pub fn py_weekly_anchor(week_ending: NaiveDate) -> NaiveDate {
    week_ending - Duration::days(PY_WEEKLY_OFFSET_DAYS)
}

/// Prior-year monthly/box-total anchor: one calendar year back, month- and
/// day-preserving. Must not be unified with [`py_weekly_anchor`].
pub fn py_monthly_anchor(date: NaiveDate) -> NaiveDate {
    add_months(date, -12)
}

/// The last day of the fiscal year containing `date`.
pub fn fiscal_year_end(date: NaiveDate, fiscal_year_end_month: Month) -> NaiveDate {
    let end_month = fiscal_year_end_month.number();
    let end_this_year =
        last_day_of_month(NaiveDate::from_ymd_opt(date.year(), end_month, 1).unwrap());
    if date <= end_this_year {
        end_this_year
    } else {
        last_day_of_month(NaiveDate::from_ymd_opt(date.year() + 1, end_month, 1).unwrap())
    }
}

/// Start of the fiscal year containing `date`, given the month the fiscal
/// year ends in. A December fiscal-year-end is the ordinary calendar year.
pub fn fiscal_year_start(date: NaiveDate, fiscal_year_end_month: Month) -> NaiveDate {
    let fy_end = fiscal_year_end(date, fiscal_year_end_month);
    first_day_of_month(add_months(fy_end, -11))
}

/// Start of the fiscal quarter containing `date` (three-month blocks ending
/// on the fiscal year end month and every three months before it).
pub fn fiscal_quarter_start(date: NaiveDate, fiscal_year_end_month: Month) -> NaiveDate {
    let fy_start = fiscal_year_start(date, fiscal_year_end_month);
    let months_since =
        (date.year() - fy_start.year()) * 12 + date.month() as i32 - fy_start.month() as i32;
    let quarter_index = months_since.div_euclid(3);
    add_months(fy_start, quarter_index * 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_day_of_month_handles_leap_year() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        assert_eq!(last_day_of_month(d), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn add_months_clamps_day() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(add_months(d, 1), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(add_months(d, -11), NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
    }

    #[test]
    fn py_weekly_anchor_preserves_weekday() {
        let week_ending = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let py = py_weekly_anchor(week_ending);
        assert_eq!(week_ending.weekday(), py.weekday());
        assert_eq!((week_ending - py).num_days(), 364);
    }

    #[test]
    fn py_monthly_anchor_is_not_364_days() {
        let week_ending = NaiveDate::from_ymd_opt(2022, 1, 15).unwrap();
        let py = py_monthly_anchor(week_ending);
        assert_eq!(py, NaiveDate::from_ymd_opt(2021, 1, 15).unwrap());
    }

    #[test]
    fn fiscal_year_calendar_december() {
        let d = NaiveDate::from_ymd_opt(2022, 3, 15).unwrap();
        assert_eq!(
            fiscal_year_start(d, Month::December),
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
        );
        assert_eq!(
            fiscal_year_end(d, Month::December),
            NaiveDate::from_ymd_opt(2022, 12, 31).unwrap()
        );
    }

    #[test]
    fn fiscal_year_march_wraps_into_prior_calendar_year() {
        // week_ending=2022-01-15 with a March fiscal year end: the fiscal
        // year containing it started 2021-04-01 and ends 2022-03-31.
        let d = NaiveDate::from_ymd_opt(2022, 1, 15).unwrap();
        assert_eq!(
            fiscal_year_start(d, Month::March),
            NaiveDate::from_ymd_opt(2021, 4, 1).unwrap()
        );
        assert_eq!(
            fiscal_year_end(d, Month::March),
            NaiveDate::from_ymd_opt(2022, 3, 31).unwrap()
        );
    }

    #[test]
    fn fiscal_quarter_start_march_year_end() {
        let d = NaiveDate::from_ymd_opt(2022, 1, 15).unwrap();
        // Fiscal year 2021-04-01..2022-03-31 splits into quarters starting
        // Apr, Jul, Oct, Jan.
        assert_eq!(
            fiscal_quarter_start(d, Month::March),
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()
        );
    }
}
