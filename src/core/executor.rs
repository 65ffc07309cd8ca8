//! Task execution and spawning traits.

use std::future::Future;

use async_trait::async_trait;

use super::{AppResult, Schedulable};

/// Abstraction for executing a unit of work.
///
/// The executor holds the business logic; the scheduler only decides when it
/// runs. An `Err` is recorded in history and published with the
/// `TaskExecuted` event; it never stops the dispatch loop.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use prometheus_task_executor::core::{AppResult, Task, TaskExecutor};
///
/// #[derive(Clone)]
/// struct GitPull;
///
/// #[async_trait]
/// impl TaskExecutor<Task<String>> for GitPull {
///     async fn execute(&self, task: Task<String>) -> AppResult<()> {
///         run_git(&["-C", &task.payload, "pull"]).await
///     }
/// }
/// ```
#[async_trait]
pub trait TaskExecutor<T>: Send + Sync + Clone + 'static
where
    T: Schedulable,
{
    /// Execute a task.
    ///
    /// # Arguments
    ///
    /// * `task` - The dequeued task, owned by the executor from here on
    ///
    /// # Returns
    ///
    /// `Ok(())` on success. If the task already timed out, the outcome is
    /// discarded.
    async fn execute(&self, task: T) -> AppResult<()>;
}

/// Abstraction for spawning work on a runtime.
pub trait Spawn {
    /// Spawn a future that runs to completion in the background.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
