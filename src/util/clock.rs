//! Wall-clock helpers shared by records and the deadline supervisor.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Render a duration as `HH:MM:SS.mmm`.
///
/// Hours are not wrapped at 24, so a two-day deadline renders as `48:00:00.000`.
pub fn format_duration_hms(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    let millis = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{hours:02}:{mins:02}:{secs:02}.{millis:03}")
}
