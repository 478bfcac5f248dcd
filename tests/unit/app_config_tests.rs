/*!
 * Tests for application configuration functionality
 */

use std::str::FromStr;
use doctrans::app_config::{Config, ExtractionConfig, LogLevel};
use doctrans::segment_engine::RedistributionPolicy;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.redistribution, RedistributionPolicy::Splice);
    assert_eq!(config.log_level, LogLevel::Info);

    assert!(config.extraction.sorted);
    assert!(config.extraction.dedup);
    assert!(!config.extraction.all_parts);
    assert!(!config.extraction.only_translatable);
}

/// Test configuration validation accepts the defaults
#[test]
fn test_config_validation_withDefaultConfig_shouldPass() {
    let config = Config::default();
    assert!(config.validate().is_ok());
}

/// Test that a partial config file fills missing fields with defaults
#[test]
fn test_deserialize_withPartialJson_shouldApplyDefaults() {
    let config: Config = serde_json::from_str(r#"{"redistribution": "proportional"}"#).unwrap();

    assert_eq!(config.redistribution, RedistributionPolicy::Proportional);
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.extraction, ExtractionConfig::default());
}

/// Test the redistribution policy serde representation
#[test]
fn test_policy_serde_withBothVariants_shouldRoundTrip() {
    assert_eq!(
        serde_json::to_string(&RedistributionPolicy::Splice).unwrap(),
        "\"splice\""
    );
    assert_eq!(
        serde_json::to_string(&RedistributionPolicy::Proportional).unwrap(),
        "\"proportional\""
    );

    let parsed: RedistributionPolicy = serde_json::from_str("\"splice\"").unwrap();
    assert_eq!(parsed, RedistributionPolicy::Splice);
}

/// Test policy parsing from strings
#[test]
fn test_policy_from_str_withVariousInputs_shouldParseOrFail() {
    assert_eq!(
        RedistributionPolicy::from_str("splice").unwrap(),
        RedistributionPolicy::Splice
    );
    assert_eq!(
        RedistributionPolicy::from_str("PROPORTIONAL").unwrap(),
        RedistributionPolicy::Proportional
    );
    assert!(RedistributionPolicy::from_str("hybrid").is_err());
}

/// Test policy display formatting
#[test]
fn test_policy_display_withBothVariants_shouldFormatLowercase() {
    assert_eq!(RedistributionPolicy::Splice.to_string(), "splice");
    assert_eq!(RedistributionPolicy::Proportional.to_string(), "proportional");
}

/// Test log level serde uses lowercase names
#[test]
fn test_log_level_serde_withLowercaseNames_shouldParse() {
    let level: LogLevel = serde_json::from_str("\"debug\"").unwrap();
    assert_eq!(level, LogLevel::Debug);

    assert_eq!(serde_json::to_string(&LogLevel::Warn).unwrap(), "\"warn\"");
}

/// Test full config serialization round trip
#[test]
fn test_config_roundtrip_withNonDefaultValues_shouldPreserveFields() {
    let mut config = Config::default();
    config.redistribution = RedistributionPolicy::Proportional;
    config.extraction.all_parts = true;
    config.extraction.sorted = false;
    config.log_level = LogLevel::Trace;

    let json = serde_json::to_string_pretty(&config).unwrap();
    let read_back: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(read_back.redistribution, RedistributionPolicy::Proportional);
    assert!(read_back.extraction.all_parts);
    assert!(!read_back.extraction.sorted);
    assert_eq!(read_back.log_level, LogLevel::Trace);
}
