//! End-to-end scenarios driven through the public `engine::run` API, each
//! corresponding to a documented concrete scenario for this engine.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use wbr_engine::config::RawConfig;
use wbr_engine::model::DailyObservation;
use wbr_engine::{lower, run, ObservationTable};

fn obs(date: NaiveDate, values: &[(&str, f64)]) -> DailyObservation {
    DailyObservation {
        date,
        values: values.iter().map(|(k, v)| (k.to_string(), Some(*v))).collect(),
    }
}

fn config_with_single_sum_metric(week_ending: &str, week_number: u32) -> RawConfig {
    let text = format!(
        r#"{{
            "setup": {{ "week_ending": "{week_ending}", "week_number": {week_number} }},
            "metrics": {{ "Sales": {{ "column": "Sales", "agg": "sum" }} }},
            "deck": []
        }}"#
    );
    serde_json::from_str(&text).unwrap()
}

/// Scenario: partial weekly sum. Six trailing weeks of otherwise-complete
/// daily `Sales`, with the 2021-09-22 observation missing — the week ending
/// 2021-09-25 is null, the other five weeks are numeric.
#[test]
fn partial_weekly_sum_nulls_only_the_incomplete_week() {
    let anchor = NaiveDate::from_ymd_opt(2021, 9, 25).unwrap();
    let raw = config_with_single_sum_metric("25-Sep-2021", 39);
    let config = lower(raw).unwrap();

    let mut rows = Vec::new();
    let mut day = anchor - Duration::days(7 * 6 - 1);
    while day <= anchor {
        if day != NaiveDate::from_ymd_opt(2021, 9, 22).unwrap() {
            rows.push(obs(day, &[("Sales", 1.0)]));
        }
        day += Duration::days(1);
    }
    let observations = ObservationTable::new(rows);

    let output = run(&config, &observations).unwrap();
    let sales = output.cy_weekly.column("Sales").unwrap();
    assert_eq!(sales.len(), 6);
    assert_eq!(sales[5], None, "week ending 2021-09-25 is missing a day and must be null");
    for (i, value) in sales.iter().enumerate().take(5) {
        assert!(value.is_some(), "week index {i} should be complete and numeric");
    }
}

/// Scenario: weekday alignment. `week_ending = 2022-01-01` is a Saturday —
/// every cyWeekly date must be a Saturday, and every pyWeekly date must sit
/// exactly 364 days behind its cyWeekly counterpart, preserving the weekday.
#[test]
fn weekday_alignment_holds_364_days_back() {
    let week_ending = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    assert_eq!(week_ending.weekday(), Weekday::Sat);

    let raw = config_with_single_sum_metric("01-Jan-2022", 1);
    let config = lower(raw).unwrap();

    let mut rows = Vec::new();
    let mut day = week_ending - Duration::days(400 + 7 * 6);
    while day <= week_ending {
        rows.push(obs(day, &[("Sales", 1.0)]));
        day += Duration::days(1);
    }
    let observations = ObservationTable::new(rows);

    let output = run(&config, &observations).unwrap();
    for date in &output.cy_weekly.dates {
        assert_eq!(date.weekday(), Weekday::Sat);
    }
    for (cy_date, py_date) in output.cy_weekly.dates.iter().zip(output.py_weekly.dates.iter()) {
        assert_eq!((*cy_date - *py_date).num_days(), 364);
        assert_eq!(py_date.weekday(), Weekday::Sat);
    }
}

/// Scenario: circular dependency. `A = sum(B, C)`, `B = sum(A, D)` must be
/// rejected before the engine ever touches observation data.
#[test]
fn circular_function_metrics_are_rejected_at_config_lowering() {
    let text = r#"{
        "setup": { "week_ending": "01-Jan-2022", "week_number": 1 },
        "metrics": {
            "A": { "op": "sum", "operands": ["B", "C"] },
            "B": { "op": "sum", "operands": ["A", "D"] },
            "C": { "column": "C", "agg": "sum" },
            "D": { "column": "D", "agg": "sum" }
        },
        "deck": []
    }"#;
    let raw: RawConfig = serde_json::from_str(text).unwrap();
    let err = lower(raw).unwrap_err();
    assert!(matches!(err, wbr_engine::EngineError::CircularDependency(_)));
}
