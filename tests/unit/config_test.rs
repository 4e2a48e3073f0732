//! Tests for configuration validation

use idle_batch::config::{IdleTickerConfig, SchedulerConfig, MAX_BATCH_BUDGET_MS};

#[test]
fn test_scheduler_config_defaults() {
    let config = SchedulerConfig::default();
    assert_eq!(config.batch_budget_ms, 100);
    assert!(config.do_work_during_idle);
    assert!(config.do_work_during_progress);
    assert!(!config.raise_immediately_on_next_trigger);
    assert!(!config.attach_on_start);
    assert!(config.validate().is_ok());
}

#[test]
fn test_scheduler_config_zero_budget_is_valid() {
    let config = SchedulerConfig::new().with_batch_budget_ms(0);
    assert!(config.validate().is_ok());
    assert!(config.batch_budget().is_zero());
}

#[test]
fn test_scheduler_config_budget_upper_bound() {
    assert!(SchedulerConfig::new()
        .with_batch_budget_ms(MAX_BATCH_BUDGET_MS)
        .validate()
        .is_ok());
    assert!(SchedulerConfig::new()
        .with_batch_budget_ms(MAX_BATCH_BUDGET_MS + 1)
        .validate()
        .is_err());
}

#[test]
fn test_scheduler_config_from_json() {
    let json = r#"{
        "batch_budget_ms": 20,
        "do_work_during_progress": false,
        "raise_immediately_on_next_trigger": true
    }"#;

    let config = SchedulerConfig::from_json_str(json).unwrap();
    assert_eq!(config.batch_budget_ms, 20);
    assert!(!config.do_work_during_progress);
    assert!(config.raise_immediately_on_next_trigger);
    // Omitted fields keep their defaults.
    assert!(config.do_work_during_idle);
    assert_eq!(config.failure_history, 64);
}

#[test]
fn test_scheduler_config_from_json_rejects_negative_budget() {
    let err = SchedulerConfig::from_json_str(r#"{ "batch_budget_ms": -1 }"#).unwrap_err();
    assert!(err.starts_with("parse error"));
}

#[test]
fn test_scheduler_config_serializes_round_trip_fields() {
    let config = SchedulerConfig::new().with_attach_on_start(true);
    let value = serde_json::to_value(&config).unwrap();
    assert_eq!(value["attach_on_start"], true);
    assert_eq!(value["batch_budget_ms"], 100);
}

#[test]
fn test_idle_ticker_config_validation() {
    let config = IdleTickerConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.idle_interval().as_millis(), 50);

    let invalid = IdleTickerConfig {
        idle_interval_ms: 0,
        progress_every: 3,
    };
    assert!(invalid.validate().is_err());
}
