// Calendar time -> epoch time for contract window parameters, plus the
// millisecond scaling used by delay pacing.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::HarnessError;

/// Date formats accepted by [`to_unix`] in addition to RFC 3339,
/// interpreted as UTC.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a date/time string into Unix epoch seconds.
///
/// Accepts RFC 3339 (`2021-07-30T12:00:00.000Z`), the `MM/DD/YYYY
/// HH:MM:SS` form the test scripts use, and bare `YYYY-MM-DD`. Naive
/// forms are read as UTC.
pub fn to_unix(date: &str) -> Result<i64, HarnessError> {
    let date = date.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Ok(dt.timestamp());
    }
    for format in DATE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(date, format) {
            return Ok(naive.and_utc().timestamp());
        }
    }
    if let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        if let Some(naive) = day.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc().timestamp());
        }
    }
    Err(HarnessError::UnparseableDate(date.to_string()))
}

/// Wall-clock epoch seconds plus an offset, for "opens in N seconds"
/// windows relative to execution time.
pub fn current_time(offset_secs: i64) -> i64 {
    Utc::now().timestamp() + offset_secs
}

/// Seconds to milliseconds.
pub const fn from_sec(sec: u64) -> u64 {
    sec * 1000
}

/// Minutes to milliseconds.
pub const fn from_min(min: u64) -> u64 {
    min * 60_000
}

/// Suspend the calling task for `ms` milliseconds.
pub async fn delay(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
