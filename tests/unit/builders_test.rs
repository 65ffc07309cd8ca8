//! Tests for builder modules

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use prometheus_task_executor::builders::{build_schedulers, SchedulerBuilder};
use prometheus_task_executor::config::{ConcurrencyMode, RegistryConfig, RemovalEnd};
use prometheus_task_executor::core::{AppResult, SchedulerError, TaskExecutor, TaskScheduler};
use prometheus_task_executor::runtime::TokioSpawner;

#[derive(Clone)]
struct Named(String);

#[async_trait]
impl TaskExecutor<String> for Named {
    async fn execute(&self, task: String) -> AppResult<()> {
        anyhow::ensure!(!task.is_empty(), "{}: empty task", self.0);
        Ok(())
    }
}

const REGISTRY: &str = r#"{
    "defaults": { "history_limit": 10 },
    "executors": {
        "orders": { "concurrency": "concurrent", "max_tasks_per_window": 5, "window_length_ms": 1000 },
        "git": { "removal_end": "back" }
    }
}"#;

#[test]
fn test_scheduler_builder_config() {
    let builder = SchedulerBuilder::new()
        .lifo()
        .concurrent()
        .default_timeout(Duration::from_secs(3))
        .throughput_limit(2, Duration::from_secs(1))
        .history_limit(50);

    let cfg = builder.config();
    assert_eq!(cfg.removal_end, RemovalEnd::Back);
    assert_eq!(cfg.concurrency, ConcurrencyMode::Concurrent);
    assert_eq!(cfg.default_task_timeout(), Some(Duration::from_secs(3)));
    assert_eq!(cfg.max_tasks_per_window, 2);
    assert_eq!(cfg.history_limit, 50);
}

#[tokio::test]
async fn test_scheduler_builder_rejects_invalid() {
    let err = SchedulerBuilder::new()
        .throughput_limit(2, Duration::ZERO)
        .build::<String, _, _>(Named("x".into()), TokioSpawner::current())
        .err()
        .expect("invalid config");
    assert!(matches!(err, SchedulerError::InvalidConfig(_)));
}

#[tokio::test]
async fn test_build_schedulers_from_registry() {
    let registry = RegistryConfig::from_json_str(REGISTRY).unwrap();
    let schedulers: HashMap<String, TaskScheduler<String, Named>> = build_schedulers(
        &registry,
        |name, _cfg| Ok(Named(name.to_string())),
        TokioSpawner::current(),
    )
    .unwrap();

    assert_eq!(schedulers.len(), 2);
    let orders = &schedulers["orders"];
    assert_eq!(orders.config().concurrency, ConcurrencyMode::Concurrent);
    assert_eq!(orders.config().history_limit, 10);
    assert_eq!(orders.status().max_tasks_per_window, 5);
    assert_eq!(schedulers["git"].config().removal_end, RemovalEnd::Back);
}

#[tokio::test]
async fn test_build_schedulers_propagates_factory_error() {
    let registry = RegistryConfig::from_json_str(REGISTRY).unwrap();
    let result = build_schedulers::<String, Named, _, _>(
        &registry,
        |name, _cfg| Err(SchedulerError::Backend(format!("{name} unavailable"))),
        TokioSpawner::current(),
    );
    assert!(matches!(result, Err(SchedulerError::Backend(_))));
}
