//! config.rs
//! Stream configuration: defaults, JSON, and environment overrides.

use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::constants::{self, DEFAULT_HIGH_WATER_MARK};
use crate::types::StreamError;

/// Which engine family to prefer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnginePreference {
    /// Probe for worker support once and use it when available.
    #[default]
    Auto,
    Worker,
    Inline,
}

impl FromStr for EnginePreference {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto"   => Ok(EnginePreference::Auto),
            "worker" => Ok(EnginePreference::Worker),
            "inline" => Ok(EnginePreference::Inline),
            other => Err(StreamError::Config(format!("unknown engine preference '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Readable-side high-water mark in bytes (byte-length sizing).
    pub readable_high_water_mark: usize,
    pub engine: EnginePreference,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            readable_high_water_mark: DEFAULT_HIGH_WATER_MARK,
            engine: EnginePreference::Auto,
        }
    }
}

impl StreamConfig {
    pub fn from_json(json: &str) -> Result<Self, StreamError> {
        let config: StreamConfig =
            serde_json::from_str(json).map_err(|e| StreamError::Config(e.to_string()))?;
        config.validate()
    }

    /// Environment config read once per process. Invalid values fall back to defaults.
    pub fn global() -> &'static StreamConfig {
        static CONFIG: OnceLock<StreamConfig> = OnceLock::new();
        CONFIG.get_or_init(|| {
            StreamConfig::from_env().unwrap_or_else(|e| {
                warn!("[CONFIG] ignoring environment config: {e}");
                StreamConfig::default()
            })
        })
    }

    pub fn from_env() -> Result<Self, StreamError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StreamError> {
        let mut config = StreamConfig::default();

        if let Some(engine) = lookup(constants::env::ENGINE) {
            config.engine = engine.parse()?;
        }
        if let Some(hwm) = lookup(constants::env::HIGH_WATER_MARK) {
            config.readable_high_water_mark = hwm.trim().parse().map_err(|_| {
                StreamError::Config(format!("{} must be a byte count, got '{hwm}'", constants::env::HIGH_WATER_MARK))
            })?;
        }
        config.validate()
    }

    pub fn validate(self) -> Result<Self, StreamError> {
        if self.readable_high_water_mark == 0 {
            return Err(StreamError::Config("readable_high_water_mark must be positive".into()));
        }
        Ok(self)
    }
}
