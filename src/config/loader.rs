//! Raw-to-resolved configuration lowering: deserialize the host-provided
//! configuration tree, apply defaults, and validate it into the typed
//! [`Config`] the engine operates on.
//!
//! The host is responsible for parsing whatever wire format the
//! configuration arrives in (YAML, JSON, ...) into this module's `Raw*`
//! types via `serde`; lowering itself is format-agnostic.

use crate::error::{ConfigurationError, EngineError, UnknownReferenceError};
use crate::function_metrics::evaluation_order;
use crate::model::calendar::Month;
use crate::model::expr_parser;
use crate::model::{
    AggKind, BlockBody, BlockSpec, BoxTotalScale, ChartSpec, ComparisonMethod, Config, EmbeddedSpec,
    FunctionOp, Metric, MetricDefinition, MetricsConfig, Operand, RowSpec, SectionSpec, Setup, TableSpec,
    XAxisMonthlyDisplay,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct RawSetup {
    pub week_ending: String,
    pub week_number: u32,
    #[serde(default)]
    pub fiscal_year_end_month: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub block_starting_number: Option<u32>,
    #[serde(default)]
    pub x_axis_monthly_display: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMetric {
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub base_column: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub agg: Option<String>,
    #[serde(default)]
    pub op: Option<String>,
    #[serde(default)]
    pub operands: Option<Vec<String>>,
    #[serde(default)]
    pub comparison_method: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRow {
    pub metric: String,
    pub row_header: String,
    #[serde(default)]
    pub row_style: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBlock {
    pub ui_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub metrics: Option<Vec<String>>,
    #[serde(default)]
    pub y_label: Option<String>,
    #[serde(default)]
    pub y_scale: Option<String>,
    #[serde(default)]
    pub box_total_scale: Option<String>,
    #[serde(default)]
    pub axes: Option<u8>,
    #[serde(default)]
    pub rows: Option<Vec<RawRow>>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawConfig {
    pub setup: RawSetup,
    pub metrics: BTreeMap<String, RawMetric>,
    pub deck: Vec<RawBlock>,
}

fn parse_week_ending(raw: &RawSetup) -> Result<NaiveDate, ConfigurationError> {
    NaiveDate::parse_from_str(&raw.week_ending, "%d-%b-%Y").map_err(|_| ConfigurationError::InvalidValue {
        section: "setup",
        field: "week_ending",
        value: raw.week_ending.clone(),
        line: None,
    })
}

fn parse_fiscal_year_end_month(raw: &RawSetup) -> Result<Month, ConfigurationError> {
    match &raw.fiscal_year_end_month {
        None => Ok(Month::December),
        Some(s) => Month::from_str(s).ok_or_else(|| ConfigurationError::InvalidValue {
            section: "setup",
            field: "fiscal_year_end_month",
            value: s.clone(),
            line: None,
        }),
    }
}

fn parse_x_axis_monthly_display(raw: &RawSetup) -> Result<XAxisMonthlyDisplay, ConfigurationError> {
    match raw.x_axis_monthly_display.as_deref() {
        None | Some("trailing_twelve_months") => Ok(XAxisMonthlyDisplay::AllMonths),
        Some("fiscal_year") => Ok(XAxisMonthlyDisplay::QuarterBoundaries),
        Some(other) => Err(ConfigurationError::InvalidValue {
            section: "setup",
            field: "x_axis_monthly_display",
            value: other.to_string(),
            line: None,
        }),
    }
}

fn lower_setup(raw: &RawSetup) -> Result<Setup, ConfigurationError> {
    Ok(Setup {
        week_ending: parse_week_ending(raw)?,
        week_number: raw.week_number,
        fiscal_year_end_month: parse_fiscal_year_end_month(raw)?,
        title: raw.title.clone().unwrap_or_default(),
        block_starting_number: raw.block_starting_number.unwrap_or(1),
        x_axis_monthly_display: parse_x_axis_monthly_display(raw)?,
    })
}

fn parse_agg(value: Option<&str>, section: &'static str, line: Option<u32>) -> Result<AggKind, ConfigurationError> {
    match value.unwrap_or("sum") {
        "sum" => Ok(AggKind::Sum),
        "first" => Ok(AggKind::First),
        "last" => Ok(AggKind::Last),
        "mean" => Ok(AggKind::Mean),
        other => Err(ConfigurationError::InvalidValue {
            section,
            field: "agg",
            value: other.to_string(),
            line,
        }),
    }
}

fn parse_comparison_method(
    value: Option<&str>,
    line: Option<u32>,
) -> Result<ComparisonMethod, ConfigurationError> {
    match value {
        None => Ok(ComparisonMethod::default()),
        Some("bps") => Ok(ComparisonMethod::Bps),
        Some("pct_change") => Ok(ComparisonMethod::PctChange),
        Some(other) => Err(ConfigurationError::InvalidValue {
            section: "metrics",
            field: "metric_comparison_method",
            value: other.to_string(),
            line,
        }),
    }
}

fn parse_function_op(value: &str, line: Option<u32>) -> Result<FunctionOp, ConfigurationError> {
    match value {
        "sum" => Ok(FunctionOp::Sum),
        "difference" => Ok(FunctionOp::Difference),
        "product" => Ok(FunctionOp::Product),
        "divide" => Ok(FunctionOp::Divide),
        other => Err(ConfigurationError::InvalidValue {
            section: "metrics",
            field: "op",
            value: other.to_string(),
            line,
        }),
    }
}

fn lower_metric_definition(
    name: &str,
    raw: &RawMetric,
) -> Result<MetricDefinition, ConfigurationError> {
    if let Some(op) = &raw.op {
        let op = parse_function_op(op, raw.line)?;
        let names = raw.operands.clone().unwrap_or_default();
        let valid_arity = if op == FunctionOp::Sum { names.len() >= 2 } else { names.len() == 2 };
        if !valid_arity {
            return Err(ConfigurationError::InvalidValue {
                section: "metrics",
                field: "operands",
                value: format!("{} operands for {:?}", names.len(), op),
                line: raw.line,
            });
        }
        return Ok(MetricDefinition::Function {
            op,
            operands: names.into_iter().map(Operand::Metric).collect(),
        });
    }

    if let Some(column) = &raw.column {
        let agg = parse_agg(raw.agg.as_deref(), "metrics", raw.line)?;
        return Ok(MetricDefinition::Column { column: column.clone(), agg });
    }

    if let (Some(base_column), Some(filter)) = (&raw.base_column, &raw.filter) {
        let agg = parse_agg(raw.agg.as_deref(), "metrics", raw.line)?;
        let predicate = expr_parser::parse(filter).map_err(|_| ConfigurationError::InvalidValue {
            section: "metrics",
            field: "filter",
            value: filter.clone(),
            line: raw.line,
        })?;
        return Ok(MetricDefinition::Filter { base_column: base_column.clone(), predicate, agg });
    }

    Err(ConfigurationError::MissingMetricDefinition { metric: name.to_string(), line: raw.line })
}

fn lower_metrics(raw: &BTreeMap<String, RawMetric>) -> Result<MetricsConfig, ConfigurationError> {
    let mut metrics = MetricsConfig::new();
    for (name, raw_metric) in raw {
        let definition = lower_metric_definition(name, raw_metric)?;
        let comparison_method = parse_comparison_method(raw_metric.comparison_method.as_deref(), raw_metric.line)?;
        metrics.insert(
            name.clone(),
            Metric { name: name.clone(), definition, comparison_method, line: raw_metric.line },
        );
    }
    Ok(metrics)
}

fn parse_box_total_scale(value: Option<&str>, line: Option<u32>) -> Result<BoxTotalScale, ConfigurationError> {
    match value.unwrap_or("%") {
        "%" => Ok(BoxTotalScale::Percent),
        "bps" => Ok(BoxTotalScale::Bps),
        other => Err(ConfigurationError::InvalidValue {
            section: "deck",
            field: "box_total_scale",
            value: other.to_string(),
            line,
        }),
    }
}

fn lower_block(index: usize, raw: &RawBlock) -> Result<BlockSpec, ConfigurationError> {
    let invalid = |reason: &str| ConfigurationError::InvalidDeckBlock {
        index,
        reason: reason.to_string(),
        line: raw.line,
    };
    let title = raw.title.clone().unwrap_or_default();
    let body = match raw.ui_type.as_str() {
        "6_12Graph" => BlockBody::Chart(ChartSpec {
            title,
            metrics: raw.metrics.clone().ok_or_else(|| invalid("chart block missing 'metrics'"))?,
            y_label: raw.y_label.clone().unwrap_or_default(),
            y_scale: raw.y_scale.clone(),
            box_total_scale: parse_box_total_scale(raw.box_total_scale.as_deref(), raw.line)?,
            axes: raw.axes.unwrap_or(1),
        }),
        "6_WeeksTable" => BlockBody::SixWeekTable(lower_table_spec(title, raw)?),
        "12_MonthsTable" => BlockBody::TwelveMonthTable(lower_table_spec(title, raw)?),
        "section" => BlockBody::Section(SectionSpec { title }),
        "embedded_content" => BlockBody::Embedded(EmbeddedSpec {
            title,
            content: raw.content.clone().unwrap_or_default(),
        }),
        other => {
            return Err(ConfigurationError::InvalidValue {
                section: "deck",
                field: "ui_type",
                value: other.to_string(),
                line: raw.line,
            })
        }
    };
    Ok(BlockSpec { body, line: raw.line })
}

fn lower_table_spec(title: String, raw: &RawBlock) -> Result<TableSpec, ConfigurationError> {
    let rows = raw
        .rows
        .clone()
        .unwrap_or_default()
        .into_iter()
        .map(|r| RowSpec { metric: r.metric, row_header: r.row_header, row_style: r.row_style })
        .collect();
    Ok(TableSpec { title, rows })
}

fn validate_references(metrics: &MetricsConfig, deck: &[BlockSpec]) -> Result<(), UnknownReferenceError> {
    for (name, metric) in metrics {
        if let MetricDefinition::Function { operands, .. } = &metric.definition {
            for Operand::Metric(operand) in operands {
                if !metrics.contains_key(operand) {
                    return Err(UnknownReferenceError::UnknownMetric {
                        referer: name.clone(),
                        operand: operand.clone(),
                        line: metric.line,
                    });
                }
            }
        }
    }

    for block in deck {
        let (block_title, block_metrics): (&str, Vec<&str>) = match &block.body {
            BlockBody::Chart(spec) => (&spec.title, spec.metrics.iter().map(String::as_str).collect()),
            BlockBody::SixWeekTable(spec) | BlockBody::TwelveMonthTable(spec) => {
                (&spec.title, spec.rows.iter().map(|r| r.metric.as_str()).collect())
            }
            _ => continue,
        };
        for metric in block_metrics {
            if !metrics.contains_key(metric) {
                return Err(UnknownReferenceError::UnknownDeckMetric {
                    block: block_title.to_string(),
                    metric: metric.to_string(),
                    line: block.line,
                });
            }
        }
    }

    Ok(())
}

/// Lower a deserialized raw configuration into a resolved, validated
/// [`Config`]: defaults applied, references checked, function-metric
/// dependency graph confirmed acyclic.
pub fn lower(raw: RawConfig) -> Result<Config, EngineError> {
    let setup = lower_setup(&raw.setup)?;
    let metrics = lower_metrics(&raw.metrics)?;
    let deck = raw
        .deck
        .iter()
        .enumerate()
        .map(|(i, b)| lower_block(i, b))
        .collect::<Result<Vec<_>, ConfigurationError>>()?;

    validate_references(&metrics, &deck)?;
    evaluation_order(&metrics).map_err(EngineError::from)?;

    Ok(Config { setup, metrics, deck })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_raw_metric(column: &str) -> RawMetric {
        RawMetric { column: Some(column.to_string()), ..RawMetric::default() }
    }

    #[test]
    fn missing_metric_definition_is_an_error() {
        let mut metrics = BTreeMap::new();
        metrics.insert("Bad".to_string(), RawMetric::default());
        let raw = RawConfig {
            setup: RawSetup {
                week_ending: "01-Jan-2022".into(),
                week_number: 1,
                fiscal_year_end_month: None,
                title: None,
                block_starting_number: None,
                x_axis_monthly_display: None,
            },
            metrics,
            deck: vec![],
        };
        let err = lower(raw).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(ConfigurationError::MissingMetricDefinition { .. })));
    }

    #[test]
    fn unknown_function_operand_is_rejected() {
        let mut metrics = BTreeMap::new();
        metrics.insert(
            "Price".to_string(),
            RawMetric {
                op: Some("divide".into()),
                operands: Some(vec!["Revenue".into(), "Units".into()]),
                ..RawMetric::default()
            },
        );
        metrics.insert("Revenue".to_string(), base_raw_metric("Revenue"));
        let raw = RawConfig {
            setup: RawSetup {
                week_ending: "01-Jan-2022".into(),
                week_number: 1,
                fiscal_year_end_month: None,
                title: None,
                block_starting_number: None,
                x_axis_monthly_display: None,
            },
            metrics,
            deck: vec![],
        };
        let err = lower(raw).unwrap_err();
        assert!(matches!(err, EngineError::UnknownReference(UnknownReferenceError::UnknownMetric { .. })));
    }

    #[test]
    fn valid_config_lowers_cleanly() {
        let mut metrics = BTreeMap::new();
        metrics.insert("Revenue".to_string(), base_raw_metric("Revenue"));
        metrics.insert("Units".to_string(), base_raw_metric("Units"));
        metrics.insert(
            "Price".to_string(),
            RawMetric {
                op: Some("divide".into()),
                operands: Some(vec!["Revenue".into(), "Units".into()]),
                comparison_method: Some("pct_change".into()),
                ..RawMetric::default()
            },
        );
        let raw = RawConfig {
            setup: RawSetup {
                week_ending: "15-Jan-2022".into(),
                week_number: 3,
                fiscal_year_end_month: Some("MAR".into()),
                title: Some("Weekly Review".into()),
                block_starting_number: None,
                x_axis_monthly_display: Some("fiscal_year".into()),
            },
            metrics,
            deck: vec![],
        };
        let config = lower(raw).unwrap();
        assert_eq!(config.setup.week_number, 3);
        assert_eq!(config.setup.fiscal_year_end_month, Month::March);
        assert_eq!(config.metrics.len(), 3);
    }
}
