//! The data model for the WBR computation engine: configuration, metrics,
//! calendar arithmetic, and the columnar tables that flow through the
//! aggregation and comparison pipeline.

pub mod calendar;
pub mod config;
pub mod expr;
pub mod expr_parser;
pub mod metric;
pub mod observation;
pub mod table;
pub mod types;

pub use calendar::Month;
pub use config::{
    BlockBody, BlockSpec, ChartSpec, Config, EmbeddedSpec, RowSpec, SectionSpec, Setup, TableSpec,
};
pub use metric::{Metric, MetricDefinition, MetricsConfig, Operand};
pub use observation::{DailyObservation, ObservationTable};
pub use table::PeriodTable;
pub use types::{AggKind, BoxTotalScale, ComparisonMethod, FunctionOp, XAxisMonthlyDisplay};
