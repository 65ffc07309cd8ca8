//! Core scheduling abstractions: tasks, queue store, throughput gate,
//! deadline supervisor and the dispatch loop.

pub mod deadline;
pub mod error;
pub mod events;
pub mod executor;
pub mod gate;
pub mod queue;
pub mod record;
pub mod scheduler;
pub mod task;

pub use deadline::{effective_timeout, supervise, Settlement};
pub use error::{AppResult, SchedulerError, TaskError};
pub use events::{EventBus, DEFAULT_EVENT_CAPACITY};
pub use executor::{Spawn, TaskExecutor};
pub use gate::{ThroughputGate, TickOutcome};
pub use queue::TaskQueue;
pub use record::{ExecutionRecord, TaskEvent};
pub use scheduler::{DispatchPhase, SnapshotOptions, TaskScheduler, DEFAULT_SLEEP};
pub use task::{Priority, Schedulable, Task, TaskPayload, DEFAULT_PRIORITY};
