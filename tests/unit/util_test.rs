//! Tests for utility functions

use prometheus_task_executor::core::Task;
use prometheus_task_executor::util::clock::{format_duration_hms, now_ms};
use prometheus_task_executor::util::{deep_clone, deep_merge, MergeOptions};
use serde_json::json;
use std::time::Duration;

#[test]
fn test_layer_partial_config() {
    let base = json!({"limits": {"max": 2, "window_ms": 1000}, "mode": "serialized"});
    let overrides = json!({"limits": {"max": 5}});
    let merged = deep_merge(&base, &overrides, &MergeOptions::default());
    assert_eq!(
        merged,
        json!({"limits": {"max": 5, "window_ms": 1000}, "mode": "serialized"})
    );
}

#[test]
fn test_combine_records_by_string_identity() {
    let target = json!([{"name": "a", "n": 1}, {"name": "b", "n": 2}]);
    let source = json!([{"name": "b", "n": 20}, {"name": "c", "n": 3}]);
    let merged = deep_merge(&target, &source, &MergeOptions::default().with_identity_key("name"));
    assert_eq!(
        merged,
        json!([{"name": "a", "n": 1}, {"name": "b", "n": 20}, {"name": "c", "n": 3}])
    );
}

#[test]
fn test_deep_clone_task() {
    let task = Task::new(vec!["--depth".to_string(), "1".to_string()])
        .with_priority(0)
        .with_timeout(Duration::from_secs(30));
    let copy = deep_clone(&task).unwrap();
    assert_eq!(copy, task);
}

#[test]
fn test_clock_helpers() {
    assert!(now_ms() > 0);
    assert_eq!(format_duration_hms(Duration::from_millis(61_001)), "00:01:01.001");
    assert_eq!(format_duration_hms(Duration::from_secs(2 * 86_400)), "48:00:00.000");
}
