use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::segment_engine::RedistributionPolicy;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Redistribution policy used when writing translations back
    #[serde(default)]
    pub redistribution: RedistributionPolicy,

    /// Extraction settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Extraction settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    // @field: Order exported lines longest-first instead of document order
    #[serde(default = "default_true")]
    pub sorted: bool,

    // @field: Drop exact duplicate lines, keeping the first occurrence
    #[serde(default = "default_true")]
    pub dedup: bool,

    // @field: Extract from every translatable part, not just the main document
    #[serde(default)]
    pub all_parts: bool,

    // @field: Skip lines that carry nothing worth translating (plain ASCII)
    #[serde(default)]
    pub only_translatable: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            sorted: true,
            dedup: true,
            all_parts: false,
            only_translatable: false,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // No cross-field constraints yet
        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            redistribution: RedistributionPolicy::default(),
            extraction: ExtractionConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
