//! API-facing status models.

use serde::{Deserialize, Serialize};

use crate::core::DispatchPhase;

/// Point-in-time view of one scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStatus {
    /// Dispatch loop phase.
    pub phase: DispatchPhase,
    /// Pending tasks.
    pub pending: usize,
    /// Dispatched tasks that have not settled.
    pub in_flight: usize,
    /// Dispatches counted in the current window.
    pub executed_in_window: u32,
    /// Active cap (0 = unlimited).
    pub max_tasks_per_window: u32,
    /// Active window length in milliseconds.
    pub window_length_ms: u64,
    /// Stored history records.
    pub history_len: usize,
}

impl SchedulerStatus {
    /// Whether nothing is pending or running.
    pub const fn is_drained(&self) -> bool {
        self.pending == 0 && self.in_flight == 0
    }

    /// Whether the throughput cap is holding tasks back.
    pub const fn is_throttled(&self) -> bool {
        self.max_tasks_per_window > 0
            && self.executed_in_window >= self.max_tasks_per_window
            && self.pending > 0
    }
}
