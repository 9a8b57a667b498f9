//! Wall-clock helpers expressed in milliseconds since the Unix epoch.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Current time in milliseconds since epoch.
///
/// A clock set before the epoch reads as `0` rather than failing.
pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Add a duration to a millisecond timestamp.
pub fn add_ms(at_ms: u128, offset: Duration) -> u128 {
    at_ms.saturating_add(offset.as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_is_after_2020() {
        assert!(now_ms() > 1_577_836_800_000);
    }

    #[test]
    fn add_ms_offsets_by_duration() {
        assert_eq!(add_ms(1_000, Duration::from_secs(900)), 901_000);
    }
}
