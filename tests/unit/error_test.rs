//! Tests for error types

use std::time::Duration;

use prometheus_task_executor::core::{SchedulerError, TaskError};

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("window_length_ms must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: window_length_ms must be greater than 0"
    );
}

#[test]
fn test_snapshot_error() {
    let err = SchedulerError::Snapshot("key must be a string".to_string());
    assert_eq!(format!("{}", err), "snapshot failed: key must be a string");
}

#[test]
fn test_backend_error() {
    let err = SchedulerError::Backend("no tokio runtime".to_string());
    assert_eq!(format!("{}", err), "backend error: no tokio runtime");
}

#[test]
fn test_timeout_message_format() {
    let err = TaskError::timeout(Duration::from_millis(3_723_004));
    assert_eq!(err.to_string(), "Timeout error (duration: 01:02:03.004)");
    assert!(err.is_timeout());
}

#[test]
fn test_failure_keeps_context_chain() {
    let err = anyhow::anyhow!("connection reset").context("fetching quote");
    let task_err = TaskError::from_anyhow(&err);
    assert_eq!(task_err, TaskError::Failed("fetching quote: connection reset".into()));
    assert!(!task_err.is_timeout());
}

#[test]
fn test_task_error_serializes() {
    let json = serde_json::to_value(TaskError::timeout(Duration::from_millis(250))).unwrap();
    assert_eq!(json, serde_json::json!({"timeout": {"duration_ms": 250}}));
}
