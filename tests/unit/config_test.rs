//! Tests for configuration validation

use std::time::Duration;

use prometheus_task_executor::config::{
    ConcurrencyMode, ExecutorConfig, InsertionEnd, RegistryConfig, RemovalEnd,
};
use serde_json::json;

#[test]
fn test_executor_config_validation() {
    let valid = ExecutorConfig::new().with_throughput_limit(2, Duration::from_secs(1));
    assert!(valid.validate().is_ok());
}

#[test]
fn test_executor_config_limit_requires_window() {
    let invalid = ExecutorConfig {
        max_tasks_per_window: 2,
        window_length_ms: 0,
        ..ExecutorConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_window_without_limit_is_fine() {
    let cfg = ExecutorConfig {
        window_length_ms: 1000,
        ..ExecutorConfig::default()
    };
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_lifo_preset() {
    let cfg = ExecutorConfig::new().lifo();
    assert_eq!(cfg.insertion_end, InsertionEnd::Back);
    assert_eq!(cfg.removal_end, RemovalEnd::Back);
}

#[test]
fn test_executor_config_from_json() {
    let cfg = ExecutorConfig::from_json_str(
        r#"{
            "removal_end": "back",
            "concurrency": "concurrent",
            "inter_task_delay_ms": 250,
            "history_limit": 100
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.removal_end, RemovalEnd::Back);
    assert_eq!(cfg.concurrency, ConcurrencyMode::Concurrent);
    assert_eq!(cfg.inter_task_delay(), Some(Duration::from_millis(250)));
    assert_eq!(cfg.history_limit, 100);
    assert_eq!(cfg.insertion_end, InsertionEnd::Back);
}

#[test]
fn test_executor_config_rejects_bad_json() {
    assert!(ExecutorConfig::from_json_str("{").is_err());
    assert!(ExecutorConfig::from_json_str(r#"{"concurrency": "parallel"}"#).is_err());
    assert!(ExecutorConfig::from_json_str(r#"{"max_tasks_per_window": 3}"#).is_err());
}

#[test]
fn test_merged_with_overrides() {
    let base = ExecutorConfig::new().with_throughput_limit(2, Duration::from_secs(1));
    let cfg = base
        .merged_with(&json!({"max_tasks_per_window": 10}))
        .unwrap();
    assert_eq!(cfg.max_tasks_per_window, 10);
    assert_eq!(cfg.window_length(), Duration::from_secs(1));
}

#[test]
fn test_registry_layers_defaults() {
    let registry = RegistryConfig::from_json_str(
        r#"{
            "defaults": { "concurrency": "concurrent", "default_task_timeout_ms": 5000 },
            "executors": {
                "orders": { "max_tasks_per_window": 5, "window_length_ms": 1000 },
                "git": { "concurrency": "serialized" }
            }
        }"#,
    )
    .unwrap();

    let resolved = registry.resolve().unwrap();
    assert_eq!(resolved.len(), 2);

    let orders = &resolved["orders"];
    assert_eq!(orders.concurrency, ConcurrencyMode::Concurrent);
    assert_eq!(orders.max_tasks_per_window, 5);
    assert_eq!(orders.default_task_timeout(), Some(Duration::from_secs(5)));

    let git = &resolved["git"];
    assert_eq!(git.concurrency, ConcurrencyMode::Serialized);
    assert_eq!(git.default_task_timeout(), Some(Duration::from_secs(5)));
}

#[test]
fn test_registry_without_executors_rejected() {
    assert!(RegistryConfig::from_json_str(r#"{"executors": {}}"#).is_err());
}

#[test]
fn test_registry_names_invalid_executor() {
    let err = RegistryConfig::from_json_str(
        r#"{"executors": {"broken": {"max_tasks_per_window": 1}}}"#,
    )
    .unwrap_err();
    assert!(err.contains("broken"));
}
