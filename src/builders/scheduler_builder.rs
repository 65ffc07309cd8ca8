//! Builders to construct schedulers from configuration.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::{ConcurrencyMode, ExecutorConfig, InsertionEnd, RegistryConfig, RemovalEnd};
use crate::core::{Schedulable, SchedulerError, Spawn, TaskExecutor, TaskScheduler};

/// Build one scheduler per named executor in `cfg`.
///
/// `executor_factory` is called once per entry with its name and resolved
/// configuration; every scheduler shares a clone of `spawner`.
///
/// # Errors
///
/// Returns [`SchedulerError::InvalidConfig`] when the registry does not
/// resolve, or the first error raised by `executor_factory`.
pub fn build_schedulers<T, E, S, FE>(
    cfg: &RegistryConfig,
    mut executor_factory: FE,
    spawner: S,
) -> Result<HashMap<String, TaskScheduler<T, E, S>>, SchedulerError>
where
    T: Schedulable,
    E: TaskExecutor<T>,
    S: Spawn + Clone + Send + Sync + 'static,
    FE: FnMut(&str, &ExecutorConfig) -> Result<E, SchedulerError>,
{
    let resolved = cfg
        .resolve()
        .map_err(|e| SchedulerError::InvalidConfig(format!("registry invalid: {e}")))?;

    let mut schedulers = HashMap::with_capacity(resolved.len());
    for (name, executor_cfg) in resolved {
        let executor = executor_factory(&name, &executor_cfg)?;
        let scheduler = TaskScheduler::new(executor_cfg, executor, spawner.clone())?;
        tracing::debug!(executor = %name, "scheduler built");
        schedulers.insert(name, scheduler);
    }

    Ok(schedulers)
}

/// Fluent construction of a single [`TaskScheduler`].
///
/// ```rust,ignore
/// let scheduler = SchedulerBuilder::new()
///     .lifo()
///     .concurrent()
///     .throughput_limit(2, Duration::from_secs(1))
///     .build(Fetcher, TokioSpawner::current())?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchedulerBuilder {
    config: ExecutorConfig,
}

impl SchedulerBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub const fn from_config(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Consume items in insertion order.
    #[must_use]
    pub const fn fifo(mut self) -> Self {
        self.config.insertion_end = InsertionEnd::Back;
        self.config.removal_end = RemovalEnd::Front;
        self
    }

    /// Consume the most recently inserted item first.
    #[must_use]
    pub const fn lifo(mut self) -> Self {
        self.config.insertion_end = InsertionEnd::Back;
        self.config.removal_end = RemovalEnd::Back;
        self
    }

    /// Run one task at a time.
    #[must_use]
    pub const fn serialized(mut self) -> Self {
        self.config.concurrency = ConcurrencyMode::Serialized;
        self
    }

    /// Run tasks as fast as the throughput gate admits them.
    #[must_use]
    pub const fn concurrent(mut self) -> Self {
        self.config.concurrency = ConcurrencyMode::Concurrent;
        self
    }

    /// Wait `delay` before each serialized dispatch.
    #[must_use]
    pub fn inter_task_delay(mut self, delay: Duration) -> Self {
        self.config = self.config.with_inter_task_delay(delay);
        self
    }

    /// Deadline for tasks that carry none of their own.
    #[must_use]
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_default_timeout(timeout);
        self
    }

    /// At most `max` dispatches per `window`.
    #[must_use]
    pub fn throughput_limit(mut self, max: u32, window: Duration) -> Self {
        self.config = self.config.with_throughput_limit(max, window);
        self
    }

    /// Keep at most `limit` history records (0 = unbounded).
    #[must_use]
    pub const fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = limit;
        self
    }

    /// Configuration assembled so far.
    pub const fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Validate the configuration and build the scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] when the configuration does not validate.
    pub fn build<T, E, S>(self, executor: E, spawner: S) -> Result<TaskScheduler<T, E, S>, SchedulerError>
    where
        T: Schedulable,
        E: TaskExecutor<T>,
        S: Spawn + Clone + Send + Sync + 'static,
    {
        TaskScheduler::new(self.config, executor, spawner)
    }
}
