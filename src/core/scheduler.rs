//! Task scheduler: queue store, throughput gate, deadline supervisor and the
//! dispatch loop tying them together.
//!
//! All mutable state lives in one `parking_lot::Mutex`. Every public
//! operation takes the lock, mutates, possibly dispatches, and releases it;
//! no lock is held across an `.await`. Timers (window ticks, inter-task
//! delay, sleep) run as spawned futures that re-enter through the same lock
//! and carry an epoch or token so a stale timer is a no-op.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, warn};

use crate::config::{validate_throughput, ConcurrencyMode, ExecutorConfig, RemovalEnd};
use crate::infra::{InMemoryHistory, InMemoryQueue};
use crate::runtime::api::SchedulerStatus;
use crate::runtime::TokioSpawner;
use crate::util::merge::deep_clone;

use super::deadline::{effective_timeout, supervise, Settlement};
use super::gate::{ThroughputGate, TickOutcome};
use super::{
    EventBus, ExecutionRecord, Schedulable, SchedulerError, Spawn, TaskError, TaskEvent,
    TaskExecutor, TaskQueue,
};

/// Cooldown applied by [`TaskScheduler::sleep`] when no duration is given.
pub const DEFAULT_SLEEP: Duration = Duration::from_secs(10);

/// Observable phase of the dispatch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPhase {
    /// Nothing outstanding.
    Idle,
    /// At least one dispatched task has not settled.
    Dispatching,
    /// Stopped by [`TaskScheduler::pause`].
    Paused,
    /// Cooling down after [`TaskScheduler::sleep`].
    Sleeping,
}

/// Options for [`TaskScheduler::snapshot`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotOptions {
    /// Include the task currently executing in serialized mode.
    pub include_current: bool,
    /// Deep-copy every task through a serde round trip instead of `Clone`.
    pub deep_copy: bool,
}

struct DispatchState<T, Q> {
    queue: Q,
    gate: ThroughputGate,
    history: InMemoryHistory<T>,
    /// Token of the outstanding serialized pull (delay wait or execution).
    outstanding: Option<u64>,
    current: Option<T>,
    paused: bool,
    sleep_epoch: Option<u64>,
    next_token: u64,
    in_flight: usize,
}

impl<T: Schedulable, Q: TaskQueue<T>> DispatchState<T, Q> {
    fn has_tasks_to_consume(&self) -> bool {
        !self.queue.is_empty() && self.gate.admits()
    }

    const fn is_sleeping(&self) -> bool {
        self.sleep_epoch.is_some()
    }

    const fn take_token(&mut self) -> u64 {
        let token = self.next_token;
        self.next_token += 1;
        token
    }

    const fn phase(&self) -> DispatchPhase {
        if self.paused {
            DispatchPhase::Paused
        } else if self.is_sleeping() {
            DispatchPhase::Sleeping
        } else if self.outstanding.is_some() || self.in_flight > 0 {
            DispatchPhase::Dispatching
        } else {
            DispatchPhase::Idle
        }
    }
}

struct Shared<T, E, S, Q>
where
    T: Schedulable,
{
    config: ExecutorConfig,
    state: Mutex<DispatchState<T, Q>>,
    events: EventBus<T>,
    executor: E,
    spawner: S,
}

/// Rate-limited, priority-aware task execution queue.
///
/// Cloning is cheap and every clone drives the same queue.
///
/// # Example
///
/// ```rust,ignore
/// let scheduler = TaskScheduler::new(
///     ExecutorConfig::new().with_default_timeout(Duration::from_secs(30)),
///     GitPull,
///     TokioSpawner::current(),
/// )?;
/// scheduler.enqueue_many(repos.into_iter().map(Task::new));
/// ```
pub struct TaskScheduler<T, E, S = TokioSpawner, Q = InMemoryQueue<T>>
where
    T: Schedulable,
{
    shared: Arc<Shared<T, E, S, Q>>,
}

impl<T, E, S, Q> Clone for TaskScheduler<T, E, S, Q>
where
    T: Schedulable,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E, S> TaskScheduler<T, E, S, InMemoryQueue<T>>
where
    T: Schedulable,
    E: TaskExecutor<T>,
    S: Spawn + Clone + Send + Sync + 'static,
{
    /// Create a scheduler backed by an [`InMemoryQueue`] laid out per `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] when `config` does not validate.
    pub fn new(config: ExecutorConfig, executor: E, spawner: S) -> Result<Self, SchedulerError> {
        let queue = InMemoryQueue::new(config.insertion_end, config.removal_end);
        Self::with_queue(config, queue, executor, spawner)
    }
}

impl<T, E, S, Q> TaskScheduler<T, E, S, Q>
where
    T: Schedulable,
    E: TaskExecutor<T>,
    S: Spawn + Clone + Send + Sync + 'static,
    Q: TaskQueue<T>,
{
    /// Create a scheduler over a caller-supplied queue store.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] when `config` does not validate.
    pub fn with_queue(
        config: ExecutorConfig,
        queue: Q,
        executor: E,
        spawner: S,
    ) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;
        debug!(?config, "TaskScheduler::new");
        let state = DispatchState {
            queue,
            gate: ThroughputGate::new(config.max_tasks_per_window, config.window_length()),
            history: InMemoryHistory::new(config.history_limit),
            outstanding: None,
            current: None,
            paused: false,
            sleep_epoch: None,
            next_token: 0,
            in_flight: 0,
        };
        Ok(Self {
            shared: Arc::new(Shared {
                events: EventBus::new(config.event_capacity),
                config,
                state: Mutex::new(state),
                executor,
                spawner,
            }),
        })
    }

    /// Queue one task and try to dispatch.
    pub fn enqueue(&self, task: T) {
        self.enqueue_many(std::iter::once(task));
    }

    /// Queue several tasks, reorder by priority once, then try to dispatch.
    pub fn enqueue_many<I>(&self, tasks: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut state = self.shared.state.lock();
        let before = state.queue.len();
        for task in tasks {
            state.queue.enqueue(task);
        }
        if state.queue.reorder_by_priority() {
            debug!("queue reordered by priority");
        }
        debug!(added = state.queue.len() - before, pending = state.queue.len(), "tasks enqueued");
        self.shared.dispatch_locked(&mut state);
    }

    /// Put a task back so it is consumed next (e.g. to retry a failure).
    ///
    /// Bypasses priority ordering.
    pub fn restore(&self, task: T) {
        let mut state = self.shared.state.lock();
        state.queue.restore(task);
        debug!(pending = state.queue.len(), "task restored");
        self.shared.dispatch_locked(&mut state);
    }

    /// Stop dispatching and stop the window timer. Running tasks continue.
    pub fn pause(&self) {
        let mut state = self.shared.state.lock();
        state.paused = true;
        state.gate.stop();
        info!(pending = state.queue.len(), "scheduler paused");
    }

    /// Resume dispatching.
    pub fn resume(&self) {
        let mut state = self.shared.state.lock();
        state.paused = false;
        info!(pending = state.queue.len(), "scheduler resumed");
        self.shared.dispatch_locked(&mut state);
    }

    /// Back off for `duration` (default [`DEFAULT_SLEEP`]).
    ///
    /// Stops the window timer, zeroes the window counter and forgets the
    /// outstanding serialized dispatch; the abandoned task's settlement still
    /// lands in history but no longer unblocks the loop. Dispatch resumes on
    /// its own once the cooldown elapses.
    pub fn sleep(&self, duration: Option<Duration>) {
        let duration = duration.unwrap_or(DEFAULT_SLEEP);
        let mut state = self.shared.state.lock();
        let epoch = state.take_token();
        state.sleep_epoch = Some(epoch);
        state.gate.reset();
        state.outstanding = None;
        state.current = None;
        warn!(?duration, pending = state.queue.len(), "scheduler sleeping");
        drop(state);

        let shared = Arc::clone(&self.shared);
        self.shared.spawner.spawn(async move {
            tokio::time::sleep(duration).await;
            shared.wake(epoch);
        });
    }

    /// Change the throughput cap while running.
    ///
    /// A running window restarts with the new limits on its next tick.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidConfig`] when `max > 0` and `window` is zero.
    pub fn update_throughput_limit(&self, max: u32, window: Duration) -> Result<(), SchedulerError> {
        validate_throughput(max, window).map_err(SchedulerError::InvalidConfig)?;
        let mut state = self.shared.state.lock();
        state.gate.update_limits(max, window);
        info!(max, ?window, "throughput limit updated");
        self.shared.dispatch_locked(&mut state);
        Ok(())
    }

    /// Independent copy of the pending tasks, in storage order.
    ///
    /// With `include_current`, the serialized task being executed is placed at
    /// the removal end so the result reads in consumption order.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Snapshot`] when `deep_copy` is set and a
    /// task does not survive a serde round trip.
    pub fn snapshot(&self, options: SnapshotOptions) -> Result<Vec<T>, SchedulerError> {
        let mut tasks = {
            let state = self.shared.state.lock();
            let mut tasks = state.queue.pending();
            if options.include_current {
                if let Some(current) = state.current.clone() {
                    match state.queue.removal_end() {
                        RemovalEnd::Front => tasks.insert(0, current),
                        RemovalEnd::Back => tasks.push(current),
                    }
                }
            }
            tasks
        };
        if options.deep_copy {
            tasks = tasks
                .iter()
                .map(deep_clone)
                .collect::<Result<_, _>>()
                .map_err(|e| SchedulerError::Snapshot(e.to_string()))?;
        }
        Ok(tasks)
    }

    /// Subscribe to dispatch events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent<T>> {
        self.shared.events.subscribe()
    }

    /// Execution history, most recent first.
    pub fn history(&self) -> Vec<ExecutionRecord<T>> {
        self.shared.state.lock().history.records()
    }

    /// Drop every history record.
    pub fn clear_history(&self) {
        self.shared.state.lock().history.clear();
    }

    /// Task currently executing in serialized mode.
    pub fn current_task(&self) -> Option<T> {
        self.shared.state.lock().current.clone()
    }

    /// Number of pending tasks.
    pub fn pending_len(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    /// Whether [`pause`](Self::pause) is in effect.
    pub fn is_paused(&self) -> bool {
        self.shared.state.lock().paused
    }

    /// Whether a [`sleep`](Self::sleep) cooldown is in effect.
    pub fn is_sleeping(&self) -> bool {
        self.shared.state.lock().is_sleeping()
    }

    /// Current phase of the dispatch loop.
    pub fn phase(&self) -> DispatchPhase {
        self.shared.state.lock().phase()
    }

    /// Point-in-time view of the scheduler.
    pub fn status(&self) -> SchedulerStatus {
        let state = self.shared.state.lock();
        SchedulerStatus {
            phase: state.phase(),
            pending: state.queue.len(),
            in_flight: state.in_flight,
            executed_in_window: state.gate.executed_in_window(),
            max_tasks_per_window: state.gate.max_per_window(),
            window_length_ms: u64::try_from(state.gate.window().as_millis()).unwrap_or(u64::MAX),
            history_len: state.history.len(),
        }
    }

    /// Configuration the scheduler was built with.
    ///
    /// Throughput limits changed through
    /// [`update_throughput_limit`](Self::update_throughput_limit) are reported
    /// by [`status`](Self::status) instead.
    pub fn config(&self) -> &ExecutorConfig {
        &self.shared.config
    }
}

impl<T, E, S, Q> Shared<T, E, S, Q>
where
    T: Schedulable,
    E: TaskExecutor<T>,
    S: Spawn + Clone + Send + Sync + 'static,
    Q: TaskQueue<T>,
{
    /// Dispatch as much as the current state allows. Caller holds the lock.
    fn dispatch_locked(self: &Arc<Self>, state: &mut DispatchState<T, Q>) {
        if state.paused || state.is_sleeping() || state.outstanding.is_some() {
            return;
        }
        if state.queue.is_empty() {
            return;
        }
        // A limited gate without a running timer opens a fresh window, so a
        // count left over from before a pause or limit change never blocks.
        if let Some((epoch, window)) = state.gate.start() {
            self.spawn_window_timer(epoch, window);
        }
        if !state.gate.admits() {
            return;
        }

        match self.config.concurrency {
            ConcurrencyMode::Serialized => {
                let token = state.take_token();
                state.outstanding = Some(token);
                match self.config.inter_task_delay() {
                    Some(delay) => {
                        let shared = Arc::clone(self);
                        self.spawner.spawn(async move {
                            tokio::time::sleep(delay).await;
                            let mut state = shared.state.lock();
                            shared.pull_serialized(&mut state, token);
                        });
                    }
                    None => self.pull_serialized(state, token),
                }
            }
            ConcurrencyMode::Concurrent => {
                while state.has_tasks_to_consume() {
                    let Some(task) = state.queue.dequeue() else {
                        break;
                    };
                    self.launch(state, task, None);
                }
                if !state.queue.is_empty() {
                    debug!(
                        pending = state.queue.len(),
                        executed = state.gate.executed_in_window(),
                        "throughput cap reached, holding tasks"
                    );
                }
            }
        }
    }

    fn pull_serialized(self: &Arc<Self>, state: &mut DispatchState<T, Q>, token: u64) {
        if state.outstanding != Some(token) {
            debug!(token, "stale serialized pull ignored");
            return;
        }
        if state.paused {
            state.outstanding = None;
            return;
        }
        let Some(task) = state.queue.dequeue() else {
            state.outstanding = None;
            return;
        };
        state.current = Some(task.clone());
        self.launch(state, task, Some(token));
    }

    /// Hand a dequeued task to the executor under deadline supervision.
    fn launch(self: &Arc<Self>, state: &mut DispatchState<T, Q>, task: T, token: Option<u64>) {
        state.gate.record_dispatch();
        state.in_flight += 1;

        let record = ExecutionRecord::started(task.clone());
        let deadline = effective_timeout(&task, self.config.default_task_timeout());
        debug!(record_id = %record.id, ?deadline, pending = state.queue.len(), "dispatching task");
        self.events.emit(TaskEvent::ExecutingTask(record.clone()));

        let (tx, rx) = oneshot::channel();
        let executor = self.executor.clone();
        let record_id = record.id;
        self.spawner.spawn(async move {
            let outcome = executor.execute(task).await;
            if tx.send(outcome).is_err() {
                debug!(%record_id, "late outcome of timed-out task discarded");
            }
        });

        let shared = Arc::clone(self);
        self.spawner.spawn(async move {
            let settlement = supervise(rx, deadline).await;
            shared.settle(record, settlement, token);
        });
    }

    fn settle(self: &Arc<Self>, record: ExecutionRecord<T>, settlement: Settlement, token: Option<u64>) {
        let event = match settlement {
            Settlement::Completed(error) => {
                let record = record.finish(error);
                match &record.error {
                    Some(err) => warn!(record_id = %record.id, error = %err, "task failed"),
                    None => debug!(record_id = %record.id, elapsed_ms = ?record.elapsed_ms(), "task executed"),
                }
                TaskEvent::TaskExecuted(record)
            }
            Settlement::TimedOut(limit) => {
                let record = record.finish(Some(TaskError::timeout(limit)));
                warn!(record_id = %record.id, deadline = ?limit, "task timed out");
                TaskEvent::TaskTimeout(record)
            }
        };

        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        state.history.record(event.record().clone());
        self.events.emit(event);

        if let Some(token) = token {
            if state.outstanding == Some(token) {
                state.outstanding = None;
                state.current = None;
                self.dispatch_locked(&mut state);
            }
        }
    }

    fn spawn_window_timer(self: &Arc<Self>, epoch: u64, window: Duration) {
        debug!(epoch, ?window, "throughput window started");
        let shared = Arc::clone(self);
        self.spawner.spawn(async move {
            loop {
                tokio::time::sleep(window).await;
                if !shared.on_window_tick(epoch) {
                    break;
                }
            }
        });
    }

    /// Returns whether the timer for `epoch` keeps ticking.
    fn on_window_tick(self: &Arc<Self>, epoch: u64) -> bool {
        let mut state = self.state.lock();
        match state.gate.on_tick(epoch) {
            TickOutcome::Stale => false,
            TickOutcome::Idle => {
                debug!(epoch, "throughput window idle, timer stopped");
                false
            }
            TickOutcome::ApplyChange => {
                info!(epoch, "throughput window restarted with new limits");
                self.dispatch_locked(&mut state);
                false
            }
            TickOutcome::Reset => {
                self.dispatch_locked(&mut state);
                true
            }
        }
    }

    fn wake(self: &Arc<Self>, epoch: u64) {
        let mut state = self.state.lock();
        if state.sleep_epoch != Some(epoch) {
            return;
        }
        state.sleep_epoch = None;
        info!(pending = state.queue.len(), "scheduler woke up");
        self.dispatch_locked(&mut state);
    }
}
