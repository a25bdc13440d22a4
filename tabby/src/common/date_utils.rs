use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the unix epoch, or 0 when the clock is before it.
#[inline]
pub fn get_current_time_or_zero() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
