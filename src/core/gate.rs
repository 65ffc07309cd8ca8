//! Throughput gate: caps dispatches per rolling window.
//!
//! The gate holds no timer itself. The scheduler spawns one per window epoch
//! and reports each tick back through [`ThroughputGate::on_tick`]; a tick
//! carrying a stale epoch is ignored, which is how a timer gets stopped.

use std::time::Duration;

/// What the scheduler should do after a window tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer belongs to a window that was already stopped.
    Stale,
    /// A limit change was pending; the counter is cleared, the timer stopped
    /// and dispatch restarts the window.
    ApplyChange,
    /// Nothing was dispatched during the window; the timer stopped.
    Idle,
    /// Counter reset; held-back items may be released.
    Reset,
}

/// Dispatch counter for the current window.
#[derive(Debug, Clone)]
pub struct ThroughputGate {
    max_per_window: u32,
    window: Duration,
    executed_in_window: u32,
    change_pending: bool,
    timer: Option<u64>,
    next_epoch: u64,
}

impl ThroughputGate {
    /// Create a gate; `max_per_window == 0` means unlimited.
    pub const fn new(max_per_window: u32, window: Duration) -> Self {
        Self {
            max_per_window,
            window,
            executed_in_window: 0,
            change_pending: false,
            timer: None,
            next_epoch: 0,
        }
    }

    /// Whether a cap is configured.
    pub const fn is_limited(&self) -> bool {
        self.max_per_window > 0
    }

    /// Admission rule: unlimited, or still below the cap.
    pub const fn admits(&self) -> bool {
        self.max_per_window == 0 || self.executed_in_window < self.max_per_window
    }

    /// Count one dispatch against the current window.
    pub const fn record_dispatch(&mut self) {
        if self.is_limited() {
            self.executed_in_window += 1;
        }
    }

    /// Whether a window timer is running.
    pub const fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Open a new window if limited and no timer is running.
    ///
    /// Returns the epoch and period of the timer the caller must spawn.
    pub const fn start(&mut self) -> Option<(u64, Duration)> {
        if !self.is_limited() || self.is_running() {
            return None;
        }
        self.executed_in_window = 0;
        let epoch = self.next_epoch;
        self.next_epoch += 1;
        self.timer = Some(epoch);
        Some((epoch, self.window))
    }

    /// Stop the running timer, if any.
    pub const fn stop(&mut self) {
        self.timer = None;
    }

    /// Stop the timer and forget the current window's dispatches.
    pub const fn reset(&mut self) {
        self.stop();
        self.executed_in_window = 0;
    }

    /// Replace the limits. A running window is restarted on its next tick.
    pub const fn update_limits(&mut self, max_per_window: u32, window: Duration) {
        self.max_per_window = max_per_window;
        self.window = window;
        if self.is_running() {
            self.change_pending = true;
        }
    }

    /// Handle a tick of the timer started for `epoch`.
    pub const fn on_tick(&mut self, epoch: u64) -> TickOutcome {
        match self.timer {
            Some(current) if current == epoch => {}
            _ => return TickOutcome::Stale,
        }
        if self.change_pending {
            self.change_pending = false;
            self.timer = None;
            self.executed_in_window = 0;
            TickOutcome::ApplyChange
        } else if self.executed_in_window == 0 {
            self.timer = None;
            TickOutcome::Idle
        } else {
            self.executed_in_window = 0;
            TickOutcome::Reset
        }
    }

    /// Dispatches counted in the current window.
    pub const fn executed_in_window(&self) -> u32 {
        self.executed_in_window
    }

    /// Configured cap.
    pub const fn max_per_window(&self) -> u32 {
        self.max_per_window
    }

    /// Configured window length.
    pub const fn window(&self) -> Duration {
        self.window
    }
}
