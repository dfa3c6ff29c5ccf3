//! Ambient engine settings: logging level and defaults, loaded from an
//! optional TOML file with environment-variable expansion.
//!
//! This is separate from [`crate::config::loader`], which lowers a WBR
//! configuration tree (setup/metrics/deck) into the engine's typed model.
//! `Settings` governs the *process*, not a single engine invocation.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// Root ambient settings structure.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// `tracing` filter directive, e.g. `"wbr_engine=info"`.
    pub log_filter: Option<String>,
    /// Default fiscal-year-end month used when a configuration omits it
    /// and the host doesn't supply one of its own.
    pub default_fiscal_year_end_month: Option<String>,
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let content = expand_env_vars(&content)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load settings from `./wbr-engine.toml`, the `WBR_ENGINE_CONFIG`
    /// environment variable, or fall back to defaults.
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("WBR_ENGINE_CONFIG") {
            return Self::from_file(path);
        }
        let local = PathBuf::from("wbr-engine.toml");
        if local.exists() {
            return Self::from_file(local);
        }
        Ok(Settings::default())
    }
}

/// Expand `${VAR}`/`$VAR` references against the process environment.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }
        if chars.peek() == Some(&'{') {
            chars.next();
            let mut var_name = String::new();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
            result.push_str(&env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?);
        } else {
            let mut var_name = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_alphanumeric() || ch == '_' {
                    var_name.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            if var_name.is_empty() {
                result.push('$');
            } else {
                result
                    .push_str(&env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?);
            }
        }
    }
    Ok(result)
}
