//! Access token freshness check

use chrono::Utc;

/// Refresh this many seconds before the nominal expiry
pub const EXPIRY_BUFFER_SECS: i64 = 300;

/// Current time in Unix seconds
pub fn now_secs() -> i64 {
    Utc::now().timestamp()
}

/// Check if a token expiring at `expires_at` (Unix seconds) should be refreshed
///
/// Returns true once fewer than 5 minutes remain; exactly 300 seconds left
/// already counts as expired.
pub fn is_expired(expires_at: i64) -> bool {
    is_expired_at(expires_at, now_secs())
}

/// Same as [`is_expired`] against an explicit clock
pub fn is_expired_at(expires_at: i64, now: i64) -> bool {
    now >= expires_at.saturating_sub(EXPIRY_BUFFER_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_expired_with_an_hour_left() {
        assert!(!is_expired(now_secs() + 3600));
    }

    #[test]
    fn test_expired_in_the_past() {
        assert!(is_expired(now_secs() - 3600));
    }

    #[test]
    fn test_expiring_soon() {
        // 2 minutes left is inside the buffer
        assert!(is_expired(now_secs() + 120));
    }

    #[test]
    fn test_buffer_boundary() {
        let now = 1_700_000_000;
        assert!(!is_expired_at(now + 301, now));
        assert!(is_expired_at(now + 300, now));
        assert!(is_expired_at(now + 299, now));
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        assert!(is_expired_at(i64::MIN, 0));
        assert!(!is_expired_at(i64::MAX, 0));
    }
}
