//! # wbr-engine
//!
//! A Weekly Business Review (WBR) computation engine: given a declarative
//! metric/deck configuration and a table of daily observations, produces the
//! exact tabular artifacts rendered in a WBR deck — a 6-week + 12-month chart
//! per metric, a 9-row box-total summary, and WoW/MoM/YoY comparisons.
//!
//! ## Pipeline
//!
//! ```text
//! daily observations ──▶ base metric series (aggregation)
//!                              │
//!                              ▼
//!                period tables (weekly, monthly ×2)
//!                              │
//!                              ▼
//!                  function metrics evaluated in
//!                     dependency order, injected
//!                              │
//!                              ▼
//!                    box totals + period summary
//!                              │
//!                              ▼
//!                         deck blocks
//! ```
//!
//! The engine is a pure function of `(Config, ObservationTable)` — see
//! [`engine::run`]. Configuration YAML/JSON parsing, database/CSV ingestion,
//! and deck rendering are host concerns outside this crate; the host
//! deserializes into [`config::RawConfig`] and calls [`config::lower`] to
//! produce the typed [`model::Config`] this crate's engine consumes.

pub mod aggregation;
pub mod box_totals;
pub mod comparison;
pub mod config;
pub mod deck;
pub mod engine;
pub mod error;
pub mod function_metrics;
pub mod model;
pub mod period;

pub use config::{lower, RawConfig};
pub use deck::Deck;
pub use engine::{run, EngineOutput};
pub use error::EngineError;
pub use model::{Config, DailyObservation, ObservationTable};
