//! Shared time and path helpers for the logging pipeline.

use std::{path::PathBuf, time::Duration};

use chrono::{DateTime, Datelike, Local, Timelike};

/// Render the timestamp prefix every emitted line carries, e.g.
/// `[08/07 14:03:21.042] `.
pub(crate) fn time_header(time: &DateTime<Local>) -> String {
    time.format("[%m/%d %H:%M:%S%.3f] ").to_string()
}

/// Day-of-month and hour-of-day pair used by calendar rotation triggers.
pub(crate) fn day_hour(time: &DateTime<Local>) -> (u32, u32) {
    (time.day(), time.hour())
}

/// Filesystem-safe timestamp used for crash-dump file names.
pub(crate) fn file_stamp(time: &DateTime<Local>) -> String {
    time.format("%Y-%m-%d-%H-%M-%S").to_string()
}

/// Time left until the next top-of-hour after `from`, with a small slack so
/// a firing timer lands strictly past the boundary.
pub(crate) fn until_next_hour(from: &DateTime<Local>) -> Duration {
    let next = (*from + chrono::Duration::hours(1))
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0));
    match next {
        Some(next) => (next - *from)
            .to_std()
            .unwrap_or(Duration::from_secs(3600))
            .saturating_add(Duration::from_millis(1)),
        // DST gaps can make the boundary unrepresentable; fall back to a
        // plain hour and let the trigger re-check decide.
        None => Duration::from_secs(3600),
    }
}

/// Time left until the next local midnight after `from`.
pub(crate) fn until_next_day(from: &DateTime<Local>) -> Duration {
    let next = (*from + chrono::Duration::hours(24))
        .with_hour(0)
        .and_then(|t| t.with_minute(0))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0));
    match next {
        Some(next) => (next - *from)
            .to_std()
            .unwrap_or(Duration::from_secs(24 * 3600))
            .saturating_add(Duration::from_millis(1)),
        None => Duration::from_secs(24 * 3600),
    }
}

/// Platform directory that anchors the default log path and crash dumps.
pub(crate) fn local_data_dir() -> PathBuf {
    dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."))
}
