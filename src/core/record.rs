//! Execution records and the events that carry them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TaskError;
use crate::util::clock::now_ms;

/// Outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord<T> {
    /// Identifier correlating the events of one dispatch.
    pub id: Uuid,
    /// The dispatched task.
    pub task: T,
    /// Dispatch time (ms since epoch).
    pub started_at_ms: u128,
    /// Completion or timeout time (ms since epoch).
    pub ended_at_ms: Option<u128>,
    /// Failure, if any.
    pub error: Option<TaskError>,
}

impl<T> ExecutionRecord<T> {
    /// Open a record for a task being dispatched now.
    pub fn started(task: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            task,
            started_at_ms: now_ms(),
            ended_at_ms: None,
            error: None,
        }
    }

    /// Close the record with an optional failure.
    #[must_use]
    pub fn finish(mut self, error: Option<TaskError>) -> Self {
        self.ended_at_ms = Some(now_ms());
        self.error = error;
        self
    }

    /// Whether the record is closed without error.
    pub const fn is_success(&self) -> bool {
        self.ended_at_ms.is_some() && self.error.is_none()
    }

    /// Whether the deadline supervisor closed the record.
    pub fn is_timeout(&self) -> bool {
        self.error.as_ref().is_some_and(TaskError::is_timeout)
    }

    /// Wall time between dispatch and close.
    pub fn elapsed_ms(&self) -> Option<u128> {
        self.ended_at_ms
            .map(|end| end.saturating_sub(self.started_at_ms))
    }
}

/// Notification published by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "record", rename_all = "camelCase")]
pub enum TaskEvent<T> {
    /// A task was dequeued and handed to the executor.
    ExecutingTask(ExecutionRecord<T>),
    /// The executor reported back before any deadline.
    TaskExecuted(ExecutionRecord<T>),
    /// The deadline elapsed first.
    TaskTimeout(ExecutionRecord<T>),
}

impl<T> TaskEvent<T> {
    /// Record carried by the event.
    pub const fn record(&self) -> &ExecutionRecord<T> {
        match self {
            Self::ExecutingTask(r) | Self::TaskExecuted(r) | Self::TaskTimeout(r) => r,
        }
    }

    /// Event name as published.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ExecutingTask(_) => "executingTask",
            Self::TaskExecuted(_) => "taskExecuted",
            Self::TaskTimeout(_) => "taskTimeout",
        }
    }
}
