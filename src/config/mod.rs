//! Configuration for the WBR computation engine: the raw-to-resolved
//! lowering pipeline for a single engine invocation (see [`loader`]), and
//! the ambient process-level [`Settings`] (see [`settings`]).

pub mod loader;
pub mod settings;

pub use loader::{lower, RawBlock, RawConfig, RawMetric, RawRow, RawSetup};
pub use settings::{expand_env_vars, Settings, SettingsError};
