//! Deck assembly: project computed period tables and box totals into the
//! chart/table/section/embedded blocks a renderer consumes.

use crate::box_totals::{BoxCell, BoxTotals, BOX_AXIS_LABELS, NUM_BOX_TOTAL_ROWS};
use crate::model::calendar::fiscal_quarter_start;
use crate::model::{
    BlockBody, BlockSpec, BoxTotalScale, ChartSpec, Config, EmbeddedSpec, Month, PeriodTable, RowSpec,
    SectionSpec, TableSpec, XAxisMonthlyDisplay,
};
use serde::Serialize;

/// One padded weekly/monthly half of a metric's y-axis data.
#[derive(Debug, Clone, Serialize, Default)]
pub struct AxisHalf {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricAxis {
    pub current: AxisHalf,
    pub previous: AxisHalf,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartTable {
    pub headers: Vec<String>,
    pub rows: Vec<ChartTableRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartTableRow {
    pub row_header: String,
    pub row_data: Vec<BoxCell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartBlock {
    pub plot_style: &'static str,
    pub title: String,
    pub y_label: String,
    pub y_scale: Option<String>,
    pub box_total_scale: BoxTotalScale,
    pub axes: u8,
    pub x_axis: Vec<String>,
    pub y_axis: std::collections::BTreeMap<String, MetricAxis>,
    pub table: ChartTable,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableBlockRow {
    pub row_header: String,
    pub row_data: Vec<Option<f64>>,
    pub row_style: Option<String>,
    pub y_scale: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableBlock {
    pub plot_style: &'static str,
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<TableBlockRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionBlock {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbeddedBlock {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "blockType")]
pub enum Block {
    Chart(ChartBlock),
    SixWeekTable(TableBlock),
    TwelveMonthTable(TableBlock),
    Section(SectionBlock),
    Embedded(EmbeddedBlock),
}

#[derive(Debug, Clone, Serialize)]
pub struct Deck {
    pub blocks: Vec<Block>,
}

fn format_value(v: Option<f64>) -> String {
    match v {
        Some(n) => format!("{n}"),
        None => String::new(),
    }
}

/// The six trailing week labels, wrapping around the 52-week year boundary
/// (`week_number` in `1..=5` walks back into the prior year's numbering
/// rather than going negative).
fn week_labels(week_number: u32) -> [String; 6] {
    std::array::from_fn(|i| {
        let offset = (6 - i) as i64;
        let n = (week_number as i64 - offset).rem_euclid(52) + 1;
        format!("wk {n}")
    })
}

fn month_abbrev(month_end: chrono::NaiveDate) -> &'static str {
    Month::from_number(chrono::Datelike::month(&month_end)).map(Month::abbrev).unwrap_or("")
}

fn month_label(month_end: chrono::NaiveDate, display: XAxisMonthlyDisplay, fiscal_year_end_month: Month) -> String {
    match display {
        XAxisMonthlyDisplay::AllMonths => month_abbrev(month_end).to_string(),
        XAxisMonthlyDisplay::QuarterBoundaries => {
            let first = crate::model::calendar::first_day_of_month(month_end);
            if fiscal_quarter_start(month_end, fiscal_year_end_month) == first {
                month_abbrev(month_end).to_string()
            } else {
                String::new()
            }
        }
    }
}

fn x_axis(week_number: u32, monthly: &PeriodTable, display: XAxisMonthlyDisplay, fy: Month) -> Vec<String> {
    let mut labels: Vec<String> = week_labels(week_number).to_vec();
    labels.push(" ".to_string());
    labels.extend(monthly.dates.iter().map(|&d| month_label(d, display, fy)));
    labels
}

fn axis_half(weekly: &PeriodTable, monthly: &PeriodTable, metric: &str) -> AxisHalf {
    let slots = 6 + 1 + monthly.len();
    let mut primary = vec![String::new(); slots];
    let mut secondary = vec![String::new(); slots];
    if let Some(col) = weekly.column(metric) {
        for (i, v) in col.iter().enumerate().take(6) {
            primary[i] = format_value(*v);
        }
    }
    if let Some(col) = monthly.column(metric) {
        for (i, v) in col.iter().enumerate() {
            secondary[7 + i] = format_value(*v);
        }
    }
    AxisHalf { primary, secondary }
}

fn chart_table(cy_box_totals: &BoxTotals, metrics: &[String]) -> ChartTable {
    let headers = BOX_AXIS_LABELS.iter().map(|s| s.to_string()).collect();
    let rows = metrics
        .iter()
        .map(|m| ChartTableRow {
            row_header: m.clone(),
            row_data: cy_box_totals
                .values
                .get(m)
                .copied()
                .unwrap_or([BoxCell::NotApplicable; NUM_BOX_TOTAL_ROWS])
                .to_vec(),
        })
        .collect();
    ChartTable { headers, rows }
}

pub fn build_chart_block(
    spec: &ChartSpec,
    setup: &crate::model::Setup,
    cy_weekly: &PeriodTable,
    py_weekly: &PeriodTable,
    cy_monthly: &PeriodTable,
    py_monthly: &PeriodTable,
    cy_box_totals: &BoxTotals,
) -> ChartBlock {
    let x_axis = x_axis(setup.week_number, cy_monthly, setup.x_axis_monthly_display, setup.fiscal_year_end_month);
    let mut y_axis = std::collections::BTreeMap::new();
    for metric in &spec.metrics {
        let current = axis_half(cy_weekly, cy_monthly, metric);
        let previous = axis_half(py_weekly, py_monthly, metric);
        y_axis.insert(metric.clone(), MetricAxis { current, previous });
    }
    ChartBlock {
        plot_style: "6_12_chart",
        title: spec.title.clone(),
        y_label: spec.y_label.clone(),
        y_scale: spec.y_scale.clone(),
        box_total_scale: spec.box_total_scale,
        axes: spec.axes,
        x_axis,
        y_axis,
        table: chart_table(cy_box_totals, &spec.metrics),
    }
}

fn table_block(plot_style: &'static str, spec: &TableSpec, source: &PeriodTable) -> TableBlock {
    let headers = source.dates.iter().map(|d| d.format("%d-%b-%Y").to_string()).collect();
    let rows = spec
        .rows
        .iter()
        .map(|row: &RowSpec| TableBlockRow {
            row_header: row.row_header.clone(),
            row_data: source.column(&row.metric).map(|c| c.to_vec()).unwrap_or_default(),
            row_style: row.row_style.clone(),
            y_scale: None,
        })
        .collect();
    TableBlock { plot_style, title: spec.title.clone(), headers, rows }
}

/// Project the computed tables into the deck's ordered block list, in the
/// order given by `config.deck`.
pub fn assemble_deck(
    config: &Config,
    cy_weekly: &PeriodTable,
    py_weekly: &PeriodTable,
    cy_monthly: &PeriodTable,
    py_monthly: &PeriodTable,
    cy_box_totals: &BoxTotals,
) -> Deck {
    let blocks = config
        .deck
        .iter()
        .map(|block: &BlockSpec| match &block.body {
            BlockBody::Chart(spec) => Block::Chart(build_chart_block(
                spec,
                &config.setup,
                cy_weekly,
                py_weekly,
                cy_monthly,
                py_monthly,
                cy_box_totals,
            )),
            BlockBody::SixWeekTable(spec) => Block::SixWeekTable(table_block("6_week_table", spec, cy_weekly)),
            BlockBody::TwelveMonthTable(spec) => {
                Block::TwelveMonthTable(table_block("12_MonthsTable", spec, cy_monthly))
            }
            BlockBody::Section(spec) => Block::Section(SectionBlock { title: spec.title.clone() }),
            BlockBody::Embedded(spec) => {
                Block::Embedded(EmbeddedBlock { title: spec.title.clone(), content: spec.content.clone() })
            }
        })
        .collect();
    Deck { blocks }
}
