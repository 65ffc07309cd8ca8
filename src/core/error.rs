//! Error types for scheduler operations and recorded task outcomes.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::clock::format_duration_hms;

/// Errors produced by scheduler components.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Configuration rejected at construction or on a live update.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A deep-copied snapshot could not be produced.
    #[error("snapshot failed: {0}")]
    Snapshot(String),
    /// Backend-specific failure with context.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Application-facing result using anyhow for higher-level contexts.
///
/// Executors return this so owners can bubble up whatever error type their
/// domain produces.
pub type AppResult<T> = Result<T, anyhow::Error>;

/// Failure captured into an execution record.
///
/// Task errors are never fatal to the scheduler. They are stored in history
/// and published with the corresponding event.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskError {
    /// The executor returned an error.
    #[error("{0}")]
    Failed(String),
    /// The executor did not finish within the effective deadline.
    #[error("Timeout error (duration: {})", timeout_label(.duration_ms))]
    Timeout {
        /// Deadline that elapsed, in milliseconds.
        duration_ms: u64,
    },
    /// The executor future panicked or was dropped before reporting.
    #[error("task aborted: {0}")]
    Aborted(String),
}

impl TaskError {
    /// Build a failure from an executor error, keeping the full context chain.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        Self::Failed(format!("{err:#}"))
    }

    /// Build a timeout failure for the given deadline.
    pub fn timeout(deadline: Duration) -> Self {
        Self::Timeout {
            duration_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Whether this failure was synthesized by the deadline supervisor.
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

fn timeout_label(duration_ms: &u64) -> String {
    format_duration_hms(Duration::from_millis(*duration_ms))
}
