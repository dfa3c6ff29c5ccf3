//! The top-level configuration tree: `setup`, `metrics`, and `deck`.
//!
//! Values here are assumed already resolved (required fields present,
//! defaults applied) — see [`crate::config`] for the raw-to-resolved
//! lowering step that produces a `Config` from deserialized input.

use super::calendar::Month;
use super::metric::MetricsConfig;
use super::types::{BoxTotalScale, XAxisMonthlyDisplay};
use chrono::NaiveDate;

/// The `setup` section: deck-wide presentation and calendar parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Setup {
    pub week_ending: NaiveDate,
    pub week_number: u32,
    pub fiscal_year_end_month: Month,
    pub title: String,
    pub block_starting_number: u32,
    pub x_axis_monthly_display: XAxisMonthlyDisplay,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            week_ending: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
            week_number: 1,
            fiscal_year_end_month: Month::December,
            title: String::new(),
            block_starting_number: 1,
            x_axis_monthly_display: XAxisMonthlyDisplay::AllMonths,
        }
    }
}

/// One row of a table block.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSpec {
    pub metric: String,
    pub row_header: String,
    pub row_style: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub metrics: Vec<String>,
    pub y_label: String,
    pub y_scale: Option<String>,
    pub box_total_scale: BoxTotalScale,
    pub axes: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    pub title: String,
    pub rows: Vec<RowSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionSpec {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedSpec {
    pub title: String,
    pub content: String,
}

/// The body of a single deck block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockBody {
    Chart(ChartSpec),
    SixWeekTable(TableSpec),
    TwelveMonthTable(TableSpec),
    Section(SectionSpec),
    Embedded(EmbeddedSpec),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockSpec {
    pub body: BlockBody,
    pub line: Option<u32>,
}

/// The fully resolved configuration for a single WBR engine invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub setup: Setup,
    pub metrics: MetricsConfig,
    pub deck: Vec<BlockSpec>,
}
