//! The engine entry point: a pure function from `(Config, ObservationTable)`
//! to a fully computed [`Deck`], plus the six intermediate artifacts for
//! callers that want them directly (e.g. golden-file tests, API responses
//! that expose raw tables alongside the deck).

use crate::aggregation::{daily_series, filtered_daily_series};
use crate::box_totals::{self, BoxTotals, PeriodSummary};
use crate::deck::{self, Deck};
use crate::error::{DataShapeError, EngineError};
use crate::function_metrics::{self, evaluation_order};
use crate::model::calendar::{last_day_of_month, py_monthly_anchor, py_weekly_anchor};
use crate::model::{AggKind, Config, MetricDefinition, MetricsConfig, ObservationTable, PeriodTable};
use crate::period::{prefix_py_columns, trailing_six_weeks, trailing_twelve_months};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// The six canonical period artifacts plus the box-total/period-summary
/// pair, and the assembled deck.
pub struct EngineOutput {
    pub cy_weekly: PeriodTable,
    pub py_weekly: PeriodTable,
    pub cy_monthly: PeriodTable,
    pub py_monthly: PeriodTable,
    pub cy_box_totals: BoxTotals,
    pub py_box_totals: BoxTotals,
    pub period_summary: PeriodSummary,
    pub deck: Deck,
}

fn check_data_shape(observations: &ObservationTable, metrics: &MetricsConfig) -> Result<(), DataShapeError> {
    if let Err((index, date, previous)) = observations.is_sorted_ascending() {
        return Err(DataShapeError::UnsortedDates { index, date, previous });
    }
    let known = observations.known_columns();
    for metric in metrics.values() {
        match &metric.definition {
            MetricDefinition::Column { column, .. } if !known.contains(column) => {
                return Err(DataShapeError::MissingColumn { metric: metric.name.clone(), column: column.clone() });
            }
            MetricDefinition::Filter { base_column, .. } if !known.contains(base_column) => {
                return Err(DataShapeError::MissingColumn {
                    metric: metric.name.clone(),
                    column: base_column.clone(),
                });
            }
            _ => {}
        }
    }
    Ok(())
}

type BaseSeriesMap = BTreeMap<String, (BTreeMap<NaiveDate, Option<f64>>, AggKind)>;

fn build_base_series(observations: &ObservationTable, metrics: &MetricsConfig) -> BaseSeriesMap {
    metrics
        .iter()
        .filter_map(|(name, metric)| {
            let (series, agg) = match &metric.definition {
                MetricDefinition::Column { column, agg } => (daily_series(&observations.rows, column, *agg), *agg),
                MetricDefinition::Filter { base_column, predicate, agg } => {
                    (filtered_daily_series(&observations.rows, base_column, predicate, *agg), *agg)
                }
                MetricDefinition::Function { .. } => return None,
            };
            Some((name.clone(), (series, agg)))
        })
        .collect()
}

/// Run the full pipeline: validate, build period tables, evaluate function
/// metrics, assemble box totals, and project the deck.
pub fn run(config: &Config, observations: &ObservationTable) -> Result<EngineOutput, EngineError> {
    check_data_shape(observations, &config.metrics)?;
    let order = evaluation_order(&config.metrics)?;

    let base_series = build_base_series(observations, &config.metrics);
    let setup = &config.setup;
    let fy = setup.fiscal_year_end_month;

    let mut cy_weekly = trailing_six_weeks(setup.week_ending, &base_series);
    let mut py_weekly = trailing_six_weeks(py_weekly_anchor(setup.week_ending), &base_series);
    let mut cy_monthly = trailing_twelve_months(setup.week_ending, fy, &base_series);
    let py_monthly_end = last_day_of_month(py_monthly_anchor(setup.week_ending));
    let mut py_monthly = trailing_twelve_months(py_monthly_end, fy, &base_series);

    for table in [&mut cy_weekly, &mut py_weekly, &mut cy_monthly, &mut py_monthly] {
        function_metrics::evaluate_into(table, &config.metrics, &order);
    }

    let (cy_box_totals, py_box_totals, period_summary) =
        box_totals::build_box_totals(observations, &config.metrics, setup);

    // Assemble the deck from the unprefixed tables before the PY__ rename
    // below, since deck projection looks metrics up by their bare name.
    let deck = deck::assemble_deck(config, &cy_weekly, &py_weekly, &cy_monthly, &py_monthly, &cy_box_totals);

    let py_weekly = prefix_py_columns(py_weekly);
    let py_monthly = prefix_py_columns(py_monthly);

    Ok(EngineOutput {
        cy_weekly,
        py_weekly,
        cy_monthly,
        py_monthly,
        cy_box_totals,
        py_box_totals,
        period_summary,
        deck,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{lower, RawConfig};
    use crate::model::DailyObservation;

    fn obs(date: &str, values: &[(&str, f64)]) -> DailyObservation {
        DailyObservation {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            values: values.iter().map(|(k, v)| (k.to_string(), Some(*v))).collect(),
        }
    }

    fn config_json(week_ending: &str) -> RawConfig {
        let text = format!(
            r#"{{
                "setup": {{ "week_ending": "{week_ending}", "week_number": 10 }},
                "metrics": {{ "Sales": {{ "column": "Sales", "agg": "sum" }} }},
                "deck": []
            }}"#
        );
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn run_produces_six_week_and_twelve_month_rows() {
        let raw = config_json("15-Jan-2022");
        let config = lower(raw).unwrap();
        let mut rows = Vec::new();
        let mut day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 1, 15).unwrap();
        while day <= end {
            rows.push(obs(&day.format("%Y-%m-%d").to_string(), &[("Sales", 1.0)]));
            day += chrono::Duration::days(1);
        }
        let observations = ObservationTable::new(rows);
        let output = run(&config, &observations).unwrap();
        assert_eq!(output.cy_weekly.len(), 6);
        assert_eq!(output.py_weekly.len(), 6);
        assert!(output.cy_monthly.len() >= 12);
        assert!(output.py_weekly.columns.contains_key("PY__Sales"));
    }
}
