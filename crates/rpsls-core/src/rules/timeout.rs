//! Elapsed-time gate for timeout claims.

use chrono::{DateTime, Duration, Utc};

/// Reference timeout window in seconds.
pub const DEFAULT_TIMEOUT_SECS: i64 = 300;

/// Longest window a deployment may configure (one year).
pub const MAX_TIMEOUT_SECS: i64 = 366 * 24 * 60 * 60;

/// `true` once at least `window` has passed since `last_action`.
///
/// A clock reading earlier than `last_action` never counts as timed out.
pub fn is_timed_out(last_action: DateTime<Utc>, window: Duration, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(last_action) >= window
}

/// Instant at which a timeout claim becomes eligible; `None` past the end of
/// the representable calendar.
pub fn deadline(last_action: DateTime<Utc>, window: Duration) -> Option<DateTime<Utc>> {
    last_action.checked_add_signed(window)
}

/// Time left before a claim is eligible; zero once it is.
pub fn remaining(last_action: DateTime<Utc>, window: Duration, now: DateTime<Utc>) -> Duration {
    let left = window - now.signed_duration_since(last_action);
    if left > Duration::zero() {
        left
    } else {
        Duration::zero()
    }
}

/// Remaining time rounded up to whole seconds
pub fn remaining_secs(last_action: DateTime<Utc>, window: Duration, now: DateTime<Utc>) -> u64 {
    let left = remaining(last_action, window, now);
    let secs = left.num_seconds();
    let rounded = if left > Duration::seconds(secs) {
        secs + 1
    } else {
        secs
    };
    rounded.max(0) as u64
}
