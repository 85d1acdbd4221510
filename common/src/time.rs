//! Time utilities for rate timestamps.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Asia::Seoul;

/// Milliseconds since the Unix epoch.
pub type EpochMillis = i64;

/// Get the current time as epoch milliseconds.
pub fn now_millis() -> EpochMillis {
    Utc::now().timestamp_millis()
}

/// Convert epoch milliseconds to a UTC timestamp.
pub fn from_millis(millis: EpochMillis) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Format a timestamp the way Korean users read it: Seoul local time,
/// `YYYY. MM. DD. HH:MM:SS` on a 24-hour clock.
pub fn format_seoul(millis: EpochMillis) -> Option<String> {
    let utc = from_millis(millis)?;
    Some(
        utc.with_timezone(&Seoul)
            .format("%Y. %m. %d. %H:%M:%S")
            .to_string(),
    )
}
