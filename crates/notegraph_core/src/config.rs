//! Explicit core configuration.
//!
//! # Responsibility
//! - Carry owner partition, layout spacing and logging settings as one value
//!   handed to the store, graph service and logger at construction time.
//! - Parse the `NOTEGRAPH_*` variables used by the CLI.
//!
//! # Invariants
//! - Owner is never blank.
//! - Layout spacings are finite and strictly positive.

use crate::graph::LayoutOptions;
use crate::logging::default_log_level;
use crate::model::note::OwnerId;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DEFAULT_OWNER: &str = "local";

pub const ENV_OWNER: &str = "NOTEGRAPH_OWNER";
pub const ENV_LOG_LEVEL: &str = "NOTEGRAPH_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NOTEGRAPH_LOG_DIR";
pub const ENV_NODE_SPACING: &str = "NOTEGRAPH_NODE_SPACING";
pub const ENV_LEVEL_SPACING: &str = "NOTEGRAPH_LEVEL_SPACING";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid value for {key}: `{value}`"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub struct CoreConfig {
    pub owner: OwnerId,
    pub layout: LayoutOptions,
    pub log_level: String,
    /// File logging is enabled only when set.
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    pub fn new(owner: impl Into<OwnerId>) -> Self {
        Self {
            owner: owner.into(),
            layout: LayoutOptions::default(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }

    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Builds a config from `(key, value)` pairs, e.g. `std::env::vars()`.
    ///
    /// Unknown keys are ignored; blank values fall back to defaults.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::new(DEFAULT_OWNER);
        for (key, value) in vars {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                ENV_OWNER => config.owner = value.to_string(),
                ENV_LOG_LEVEL => config.log_level = value.to_string(),
                ENV_LOG_DIR => config.log_dir = Some(PathBuf::from(value)),
                ENV_NODE_SPACING => {
                    config.layout.node_spacing = parse_spacing(ENV_NODE_SPACING, value)?
                }
                ENV_LEVEL_SPACING => {
                    config.layout.level_spacing = parse_spacing(ENV_LEVEL_SPACING, value)?
                }
                _ => {}
            }
        }
        Ok(config)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_OWNER)
    }
}

/// Parses a layout spacing; it must be finite and strictly positive.
pub fn parse_spacing(key: &'static str, value: &str) -> Result<f64, ConfigError> {
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed > 0.0 => Ok(parsed),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}
