//! # Prometheus Task Executor
//!
//! A configurable, rate-limited task execution queue for AI agent workloads.
//!
//! Work items are pushed into a queue store and handed to an owner-supplied
//! [`TaskExecutor`](core::TaskExecutor) either one at a time (serialized) or as
//! fast as the throughput gate admits them (concurrent). The scheduler itself is
//! domain-agnostic: it only decides *when* a task runs, never *what* it does.
//!
//! ## Core Problem Solved
//!
//! Upstream APIs (LLM providers, exchanges, search backends) impose request
//! budgets per time window and occasionally stall without answering:
//!
//! - **Throughput caps**: no more than `N` dispatches within any window of length `W`
//! - **Stalled calls**: a per-task deadline abandons a call that never answers
//! - **Ordering**: FIFO or LIFO consumption with optional priority tiers
//! - **Backoff**: pause/resume and an explicit cooldown when the upstream pushes back
//!
//! ## Key Features
//!
//! - **Serialized or concurrent dispatch** with an optional delay between serialized tasks
//! - **Throughput gate** that idles its timer when nothing was dispatched
//! - **Deadline supervisor** that records a timeout without cancelling the operation
//! - **Event feed** (`ExecutingTask`, `TaskExecuted`, `TaskTimeout`) over a broadcast channel
//! - **Execution history**, most recent first
//! - **Independent snapshots** of pending work, optionally deep-copied
//!
//! ## Example
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use prometheus_task_executor::config::{ConcurrencyMode, ExecutorConfig};
//! use prometheus_task_executor::core::{AppResult, Task, TaskExecutor, TaskScheduler};
//! use prometheus_task_executor::runtime::TokioSpawner;
//! use std::time::Duration;
//!
//! #[derive(Clone)]
//! struct OrderPlacer;
//!
//! #[async_trait]
//! impl TaskExecutor<Task<String>> for OrderPlacer {
//!     async fn execute(&self, task: Task<String>) -> AppResult<()> {
//!         place_order(&task.payload).await
//!     }
//! }
//!
//! let config = ExecutorConfig::new()
//!     .with_concurrency(ConcurrencyMode::Concurrent)
//!     .with_throughput_limit(5, Duration::from_secs(1));
//!
//! let scheduler = TaskScheduler::new(config, OrderPlacer, TokioSpawner::current())?;
//! let mut events = scheduler.subscribe();
//! scheduler.enqueue(Task::new("BTC-USD".to_string()).with_priority(1));
//! ```
//!
//! For complete examples, see:
//! - `tests/scheduler_test.rs` - Dispatch order, pause/resume and history
//! - `tests/throughput_test.rs` - Window cap and live limit changes
//! - `tests/deadline_test.rs` - Timeouts in both concurrency modes

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: tasks, executor trait, dispatch loop.
pub mod core;
/// Configuration models for executors and named registries.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Infrastructure adapters for the queue store and history log.
pub mod infra;
/// Runtime adapters and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
