//! Shared executors and event helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use prometheus_task_executor::core::{AppResult, Schedulable, Task, TaskEvent, TaskExecutor};
use tokio::sync::broadcast;

/// Records every task it executes, after an optional simulated workload.
#[derive(Clone)]
pub struct Recorder<T> {
    pub seen: Arc<Mutex<Vec<T>>>,
    pub work: Duration,
}

impl<T> Recorder<T> {
    pub fn new() -> Self {
        Self::with_work(Duration::ZERO)
    }

    pub fn with_work(work: Duration) -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
            work,
        }
    }
}

impl<T: Clone> Recorder<T> {
    pub fn seen(&self) -> Vec<T> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl<T: Schedulable> TaskExecutor<T> for Recorder<T> {
    async fn execute(&self, task: T) -> AppResult<()> {
        if !self.work.is_zero() {
            tokio::time::sleep(self.work).await;
        }
        self.seen.lock().push(task);
        Ok(())
    }
}

/// Fails every task whose name starts with `fail`.
#[derive(Clone, Default)]
pub struct Flaky {
    pub seen: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl TaskExecutor<String> for Flaky {
    async fn execute(&self, task: String) -> AppResult<()> {
        self.seen.lock().push(task.clone());
        if task.starts_with("fail") {
            anyhow::bail!("upstream rejected {task}");
        }
        Ok(())
    }
}

/// Sleeps for `payload` milliseconds.
#[derive(Clone, Default)]
pub struct Sleeper {
    pub finished: Arc<Mutex<Vec<u64>>>,
}

#[async_trait]
impl TaskExecutor<Task<u64>> for Sleeper {
    async fn execute(&self, task: Task<u64>) -> AppResult<()> {
        tokio::time::sleep(Duration::from_millis(task.payload)).await;
        self.finished.lock().push(task.payload);
        Ok(())
    }
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

/// Next event, failing the test if the feed closes.
pub async fn next_event<T: Clone>(rx: &mut broadcast::Receiver<TaskEvent<T>>) -> TaskEvent<T> {
    rx.recv().await.expect("event feed closed")
}

/// Next `TaskExecuted` or `TaskTimeout` event.
pub async fn next_settled<T: Clone>(rx: &mut broadcast::Receiver<TaskEvent<T>>) -> TaskEvent<T> {
    loop {
        let event = next_event(rx).await;
        if !matches!(event, TaskEvent::ExecutingTask(_)) {
            return event;
        }
    }
}

/// Collect `n` settled events.
pub async fn settle_n<T: Clone>(rx: &mut broadcast::Receiver<TaskEvent<T>>, n: usize) -> Vec<TaskEvent<T>> {
    let mut events = Vec::with_capacity(n);
    for _ in 0..n {
        events.push(next_settled(rx).await);
    }
    events
}
