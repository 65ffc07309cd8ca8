//! Deadline supervisor.
//!
//! The executor runs in its own spawned future and reports through a oneshot
//! channel. The supervisor waits on that channel, bounded by the effective
//! deadline. Losing the race only drops the receiver: the operation keeps
//! running and its late outcome is discarded by the sender side.

use std::time::Duration;

use tokio::sync::oneshot;

use super::{AppResult, Schedulable, TaskError};

/// How a supervised dispatch settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The executor reported first; carries its failure, if any.
    Completed(Option<TaskError>),
    /// The deadline elapsed first.
    TimedOut(Duration),
}

/// Deadline that applies to `task`.
///
/// A non-zero per-task timeout wins over the scheduler default; zero on
/// either side means "not set".
pub fn effective_timeout<T: Schedulable>(task: &T, default: Option<Duration>) -> Option<Duration> {
    task.timeout()
        .filter(|d| !d.is_zero())
        .or_else(|| default.filter(|d| !d.is_zero()))
}

/// Wait for the executor outcome, bounded by `deadline`.
pub async fn supervise(
    outcome: oneshot::Receiver<AppResult<()>>,
    deadline: Option<Duration>,
) -> Settlement {
    let received = match deadline {
        Some(limit) => match tokio::time::timeout(limit, outcome).await {
            Ok(received) => received,
            Err(_) => return Settlement::TimedOut(limit),
        },
        None => outcome.await,
    };
    match received {
        Ok(Ok(())) => Settlement::Completed(None),
        Ok(Err(err)) => Settlement::Completed(Some(TaskError::from_anyhow(&err))),
        Err(_) => Settlement::Completed(Some(TaskError::Aborted(
            "executor dropped before reporting an outcome".into(),
        ))),
    }
}
