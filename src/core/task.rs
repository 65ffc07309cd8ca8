//! Task payloads and the scheduling hints they may carry.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Priority value; lower numbers are served first.
pub type Priority = u32;

/// Priority assumed for items that do not state one.
pub const DEFAULT_PRIORITY: Priority = 1;

/// Marker trait for payloads the scheduler can hold, clone and snapshot.
///
/// Payloads must be `Send + Sync` for cross-task execution and
/// `Serialize + Deserialize` so snapshots can be deep-copied.
pub trait TaskPayload: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {}

/// Blanket implementation: any type meeting the requirements is a `TaskPayload`.
impl<T> TaskPayload for T where T: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {}

/// A unit of work the scheduler can queue.
///
/// Bare payloads keep the defaults and never take part in priority
/// reordering. Structured records report `is_prioritized() == true` and may
/// override the scheduler-wide deadline through `timeout()`.
pub trait Schedulable: TaskPayload {
    /// Priority of this item, if it states one.
    fn priority(&self) -> Option<Priority> {
        None
    }

    /// Whether this item exposes a priority field at all.
    ///
    /// Reordering is only attempted when the item at the removal end does.
    fn is_prioritized(&self) -> bool {
        self.priority().is_some()
    }

    /// Per-item deadline overriding the scheduler default.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Priority used for ordering, falling back to [`DEFAULT_PRIORITY`].
    fn effective_priority(&self) -> Priority {
        self.priority().unwrap_or(DEFAULT_PRIORITY)
    }
}

macro_rules! bare_payload {
    ($($ty:ty),* $(,)?) => {
        $(impl Schedulable for $ty {})*
    };
}

bare_payload!(String, u16, u32, u64, usize, i32, i64);

/// JSON objects behave like structured records: `priority` and `timeout`
/// (milliseconds) are read from their fields.
///
/// Any finite numeric `priority` counts: fractions round down and the result
/// is clamped to the `Priority` range, so `-3` is `0` and `2.7` is `2`.
/// Non-numeric values fall back to [`DEFAULT_PRIORITY`].
impl Schedulable for serde_json::Value {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn priority(&self) -> Option<Priority> {
        self.get("priority")
            .and_then(serde_json::Value::as_f64)
            .filter(|p| p.is_finite())
            .map(|p| p.floor().clamp(0.0, f64::from(Priority::MAX)) as Priority)
    }

    fn is_prioritized(&self) -> bool {
        self.as_object().is_some_and(|o| o.contains_key("priority"))
    }

    fn timeout(&self) -> Option<Duration> {
        self.get("timeout")
            .and_then(serde_json::Value::as_u64)
            .map(Duration::from_millis)
    }
}

/// Structured task record wrapping an arbitrary payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task<P> {
    /// Owner-defined payload handed to the executor.
    pub payload: P,
    /// Priority; `None` means [`DEFAULT_PRIORITY`].
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Deadline in milliseconds; `None` or `0` falls back to the scheduler default.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl<P> Task<P> {
    /// Wrap a payload with default priority and no deadline.
    pub const fn new(payload: P) -> Self {
        Self {
            payload,
            priority: None,
            timeout_ms: None,
        }
    }

    /// Set the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set a per-task deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }
}

impl<P: TaskPayload> Schedulable for Task<P> {
    fn priority(&self) -> Option<Priority> {
        self.priority
    }

    fn is_prioritized(&self) -> bool {
        true
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.filter(|ms| *ms > 0).map(Duration::from_millis)
    }
}
