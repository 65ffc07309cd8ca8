//! Executor and registry configuration structures.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::events::DEFAULT_EVENT_CAPACITY;
use crate::util::merge::{deep_merge, MergeOptions};

/// Prefix of the environment variables read by [`ExecutorConfig::from_env`].
pub const ENV_PREFIX: &str = "TASK_EXECUTOR_";

/// End of the queue new items are inserted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertionEnd {
    /// Insert before every pending item.
    Front,
    /// Insert after every pending item.
    #[default]
    Back,
}

/// End of the queue items are consumed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalEnd {
    /// Consume the first item.
    #[default]
    Front,
    /// Consume the last item.
    Back,
}

/// How dispatched items overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyMode {
    /// One item at a time; the next pull waits for completion or timeout.
    #[default]
    Serialized,
    /// Launch as many items as the throughput gate admits.
    Concurrent,
}

/// Configuration of one task scheduler.
///
/// All fields are optional in serialized form; defaults give a FIFO,
/// serialized scheduler without delay, deadline or throughput cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Where new items are inserted.
    pub insertion_end: InsertionEnd,
    /// Where items are consumed from.
    pub removal_end: RemovalEnd,
    /// Serialized or concurrent dispatch.
    pub concurrency: ConcurrencyMode,
    /// Pause between serialized dispatches, in milliseconds.
    pub inter_task_delay_ms: u64,
    /// Deadline for tasks that do not state their own, in milliseconds (0 = none).
    pub default_task_timeout_ms: u64,
    /// Dispatches allowed per window (0 = unlimited).
    pub max_tasks_per_window: u32,
    /// Window length in milliseconds.
    pub window_length_ms: u64,
    /// Execution records kept in history (0 = unbounded).
    pub history_limit: usize,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            insertion_end: InsertionEnd::Back,
            removal_end: RemovalEnd::Front,
            concurrency: ConcurrencyMode::Serialized,
            inter_task_delay_ms: 0,
            default_task_timeout_ms: 0,
            max_tasks_per_window: 0,
            window_length_ms: 0,
            history_limit: 0,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ExecutorConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// First in, first out.
    #[must_use]
    pub const fn fifo(mut self) -> Self {
        self.insertion_end = InsertionEnd::Back;
        self.removal_end = RemovalEnd::Front;
        self
    }

    /// Last in, first out.
    #[must_use]
    pub const fn lifo(mut self) -> Self {
        self.insertion_end = InsertionEnd::Back;
        self.removal_end = RemovalEnd::Back;
        self
    }

    /// Set the insertion end.
    #[must_use]
    pub const fn with_insertion_end(mut self, end: InsertionEnd) -> Self {
        self.insertion_end = end;
        self
    }

    /// Set the removal end.
    #[must_use]
    pub const fn with_removal_end(mut self, end: RemovalEnd) -> Self {
        self.removal_end = end;
        self
    }

    /// Set the concurrency mode.
    #[must_use]
    pub const fn with_concurrency(mut self, mode: ConcurrencyMode) -> Self {
        self.concurrency = mode;
        self
    }

    /// Set the pause between serialized dispatches.
    #[must_use]
    pub fn with_inter_task_delay(mut self, delay: Duration) -> Self {
        self.inter_task_delay_ms = duration_ms(delay);
        self
    }

    /// Set the default per-task deadline.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_task_timeout_ms = duration_ms(timeout);
        self
    }

    /// Cap dispatches to `max` per `window`.
    #[must_use]
    pub fn with_throughput_limit(mut self, max: u32, window: Duration) -> Self {
        self.max_tasks_per_window = max;
        self.window_length_ms = duration_ms(window);
        self
    }

    /// Bound the history length.
    #[must_use]
    pub const fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Set the event channel capacity.
    #[must_use]
    pub const fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Pause between serialized dispatches, if any.
    pub const fn inter_task_delay(&self) -> Option<Duration> {
        non_zero_ms(self.inter_task_delay_ms)
    }

    /// Default per-task deadline, if any.
    pub const fn default_task_timeout(&self) -> Option<Duration> {
        non_zero_ms(self.default_task_timeout_ms)
    }

    /// Throughput window length.
    pub const fn window_length(&self) -> Duration {
        Duration::from_millis(self.window_length_ms)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        validate_throughput(self.max_tasks_per_window, self.window_length())?;
        if self.event_capacity == 0 {
            return Err("event_capacity must be greater than 0".into());
        }
        Ok(())
    }

    /// Layer a partial JSON object over this configuration and validate.
    ///
    /// # Errors
    ///
    /// Returns a description when the merged document is not a valid config.
    pub fn merged_with(&self, overrides: &Value) -> Result<Self, String> {
        let base = serde_json::to_value(self).map_err(|e| format!("serialize error: {e}"))?;
        let merged = deep_merge(&base, overrides, &MergeOptions::default());
        let cfg: Self = serde_json::from_value(merged).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a (possibly partial) JSON document over the defaults and validate.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let overrides: Value = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        Self::default().merged_with(&overrides)
    }

    /// Read `TASK_EXECUTOR_*` variables (after loading `.env`, if present).
    ///
    /// # Errors
    ///
    /// Returns a description of a malformed or unreadable `.env` file, or of
    /// the first unparseable variable.
    pub fn from_env() -> Result<Self, String> {
        ignore_missing_env_file(dotenvy::dotenv())?;
        Self::from_vars(std::env::vars())
    }

    /// Build from `(name, value)` pairs using the `TASK_EXECUTOR_` prefix.
    ///
    /// Unknown variables are ignored. Enum values use their snake_case names
    /// (`front`, `back`, `serialized`, `concurrent`).
    ///
    /// # Errors
    ///
    /// Returns a description of the first unparseable variable.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut overrides = serde_json::Map::new();
        for (key, value) in vars {
            let Some(field) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let field = field.to_ascii_lowercase();
            let value = value.as_ref().trim();
            let parsed = match field.as_str() {
                "insertion_end" | "removal_end" | "concurrency" => {
                    Value::String(value.to_ascii_lowercase())
                }
                "inter_task_delay_ms" | "default_task_timeout_ms" | "max_tasks_per_window"
                | "window_length_ms" | "history_limit" | "event_capacity" => value
                    .parse::<u64>()
                    .map(Value::from)
                    .map_err(|e| format!("{ENV_PREFIX}{}: {e}", field.to_ascii_uppercase()))?,
                _ => continue,
            };
            overrides.insert(field, parsed);
        }
        Self::default().merged_with(&Value::Object(overrides))
    }
}

/// Named executor configurations sharing a common base.
///
/// ```json
/// {
///   "defaults": { "concurrency": "concurrent" },
///   "executors": {
///     "orders": { "max_tasks_per_window": 5, "window_length_ms": 1000 },
///     "git": { "concurrency": "serialized", "default_task_timeout_ms": 30000 }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Partial configuration applied to every executor.
    #[serde(default)]
    pub defaults: Value,
    /// Map of executor name to partial configuration.
    pub executors: HashMap<String, Value>,
}

impl RegistryConfig {
    /// Resolve every executor by layering defaults and overrides.
    ///
    /// # Errors
    ///
    /// Returns a description naming the first invalid executor.
    pub fn resolve(&self) -> Result<HashMap<String, ExecutorConfig>, String> {
        if self.executors.is_empty() {
            return Err("at least one executor must be defined".into());
        }
        let base = if self.defaults.is_null() {
            ExecutorConfig::default()
        } else {
            ExecutorConfig::default()
                .merged_with(&self.defaults)
                .map_err(|e| format!("defaults invalid: {e}"))?
        };
        self.executors
            .iter()
            .map(|(name, overrides)| {
                base.merged_with(overrides)
                    .map(|cfg| (name.clone(), cfg))
                    .map_err(|e| format!("executor `{name}` invalid: {e}"))
            })
            .collect()
    }

    /// Validate all executors.
    ///
    /// # Errors
    ///
    /// Returns a description naming the first invalid executor.
    pub fn validate(&self) -> Result<(), String> {
        self.resolve().map(|_| ())
    }

    /// Parse registry configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Returns a description of the parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Validate a throughput limit pair.
///
/// # Errors
///
/// Returns a description when a cap is set without a window.
pub fn validate_throughput(max: u32, window: Duration) -> Result<(), String> {
    if max > 0 && window.is_zero() {
        return Err("window_length_ms must be greater than 0 when max_tasks_per_window is set".into());
    }
    Ok(())
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

const fn non_zero_ms(ms: u64) -> Option<Duration> {
    if ms == 0 {
        None
    } else {
        Some(Duration::from_millis(ms))
    }
}

/// A missing `.env` is fine; any other load failure is reported.
fn ignore_missing_env_file<T>(loaded: Result<T, dotenvy::Error>) -> Result<(), String> {
    match loaded {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(format!(".env error: {e}")),
    }
}
