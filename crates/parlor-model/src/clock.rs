//! Wall-clock helper.
//!
//! Room documents carry absolute millisecond timestamps (`created_at_ms`,
//! presence stamps) because the retention sweep and staleness checks compare
//! against values written by other devices — a monotonic clock would not
//! survive the trip through the store.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
