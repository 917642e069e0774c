//! Account lockout state machine.
//!
//! An account is either *unlocked*, with `login_attempts` below the policy's
//! maximum, or *locked* until `locked_until`. Locks are lifted lazily: nothing
//! sweeps them, a lapsed lock is simply treated as absent the next time the
//! account is checked.

use chrono::{DateTime, Duration, Utc};

use crate::models::User;

/// Consecutive failures that lock an account.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// How long a lock lasts: 15 minutes.
pub const DEFAULT_LOCK_DURATION_SECS: u64 = 15 * 60;

/// Longest lock the configuration accepts: 10 years.
pub const MAX_LOCK_DURATION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Lockout thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    pub max_attempts: u32,
    pub lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            lock_duration: Duration::seconds(DEFAULT_LOCK_DURATION_SECS as i64),
        }
    }
}

/// Lock status of an account at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Unlocked,
    Locked { until: DateTime<Utc> },
}

/// Result of recording a failed password check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Still unlocked; this many failures are left before the lock.
    Retry { remaining_attempts: u32 },
    /// This failure locked the account.
    Locked { until: DateTime<Utc> },
}

impl LockoutPolicy {
    pub fn new(max_attempts: u32, lock_duration: Duration) -> Self {
        Self {
            max_attempts,
            lock_duration,
        }
    }

    /// Count a failed password check against an unlocked account.
    ///
    /// A lock that would end past the last representable instant ends there
    /// instead.
    pub fn record_failure(&self, user: &mut User, now: DateTime<Utc>) -> FailureOutcome {
        user.login_attempts = user.login_attempts.saturating_add(1);

        if user.login_attempts >= self.max_attempts {
            let until = now
                .checked_add_signed(self.lock_duration)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            user.locked_until = Some(until);
            FailureOutcome::Locked { until }
        } else {
            FailureOutcome::Retry {
                remaining_attempts: self.max_attempts - user.login_attempts,
            }
        }
    }
}

/// Current lock status of `user`.
pub fn lock_state(user: &User, now: DateTime<Utc>) -> LockState {
    match user.locked_until {
        Some(until) if now < until => LockState::Locked { until },
        _ => LockState::Unlocked,
    }
}

/// Clear a lock whose time has passed, restarting the attempt count.
///
/// Returns `true` if a lapsed lock was cleared.
pub fn release_expired(user: &mut User, now: DateTime<Utc>) -> bool {
    match user.locked_until {
        Some(until) if until <= now => {
            user.locked_until = None;
            user.login_attempts = 0;
            true
        }
        _ => false,
    }
}

/// Reset lockout state after a successful login.
pub fn record_success(user: &mut User) {
    user.login_attempts = 0;
    user.locked_until = None;
}

/// Milliseconds until `until`, never negative.
pub fn remaining_millis(until: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (until - now).num_milliseconds().max(0) as u64
}

/// Human wording for a lock length: "15 minutes", "1 minute", "90 seconds".
pub fn describe_lock_duration(duration: Duration) -> String {
    let secs = duration.num_seconds().max(0);
    let (count, unit) = if secs > 0 && secs % 60 == 0 {
        (secs / 60, "minute")
    } else {
        (secs, "second")
    };

    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Format a remaining duration as `m:ss`, truncating sub-second remainders.
pub fn format_lock_time(remaining_ms: u64) -> String {
    let minutes = remaining_ms / 60_000;
    let seconds = (remaining_ms % 60_000) / 1000;
    format!("{}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn user() -> User {
        User::new("1", "user@example.com", "Test User", "hash")
    }

    #[test]
    fn test_default_policy() {
        let policy = LockoutPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.lock_duration, Duration::minutes(15));
    }

    #[test]
    fn test_lock_past_calendar_end_saturates() {
        let policy = LockoutPolicy::new(1, Duration::seconds(MAX_LOCK_DURATION_SECS as i64));
        let mut user = user();
        let now = DateTime::<Utc>::MAX_UTC - Duration::days(1);

        assert_eq!(
            policy.record_failure(&mut user, now),
            FailureOutcome::Locked { until: DateTime::<Utc>::MAX_UTC }
        );
        assert!(matches!(lock_state(&user, now), LockState::Locked { .. }));
    }

    #[test]
    fn test_failures_count_down_then_lock() {
        let policy = LockoutPolicy::default();
        let mut user = user();
        let now = Utc::now();

        assert_eq!(
            policy.record_failure(&mut user, now),
            FailureOutcome::Retry { remaining_attempts: 2 }
        );
        assert_eq!(
            policy.record_failure(&mut user, now),
            FailureOutcome::Retry { remaining_attempts: 1 }
        );
        assert_eq!(
            policy.record_failure(&mut user, now),
            FailureOutcome::Locked { until: now + Duration::minutes(15) }
        );

        assert_eq!(user.login_attempts, 3);
        assert_eq!(user.locked_until, Some(now + Duration::minutes(15)));
        assert_eq!(
            lock_state(&user, now),
            LockState::Locked { until: now + Duration::minutes(15) }
        );
    }

    #[test]
    fn test_custom_policy_threshold() {
        let policy = LockoutPolicy::new(1, Duration::minutes(5));
        let mut user = user();
        let now = Utc::now();

        assert_eq!(
            policy.record_failure(&mut user, now),
            FailureOutcome::Locked { until: now + Duration::minutes(5) }
        );
    }

    #[test]
    fn test_lock_state_boundaries() {
        let mut user = user();
        let now = Utc::now();
        assert_eq!(lock_state(&user, now), LockState::Unlocked);

        user.locked_until = Some(now);
        assert_eq!(lock_state(&user, now), LockState::Unlocked);

        user.locked_until = Some(now + Duration::milliseconds(1));
        assert!(matches!(lock_state(&user, now), LockState::Locked { .. }));
    }

    #[test]
    fn test_release_expired_only_when_lapsed() {
        let now = Utc::now();

        let mut active = user();
        active.login_attempts = 3;
        active.locked_until = Some(now + Duration::minutes(1));
        assert!(!release_expired(&mut active, now));
        assert_eq!(active.login_attempts, 3);

        let mut lapsed = user();
        lapsed.login_attempts = 3;
        lapsed.locked_until = Some(now - Duration::seconds(1));
        assert!(release_expired(&mut lapsed, now));
        assert_eq!(lapsed.login_attempts, 0);
        assert_eq!(lapsed.locked_until, None);

        let mut never_locked = user();
        never_locked.login_attempts = 1;
        assert!(!release_expired(&mut never_locked, now));
        assert_eq!(never_locked.login_attempts, 1);
    }

    #[test]
    fn test_success_resets() {
        let mut user = user();
        user.login_attempts = 2;
        user.locked_until = Some(Utc::now() - Duration::minutes(1));

        record_success(&mut user);
        assert_eq!(user.login_attempts, 0);
        assert_eq!(user.locked_until, None);
    }

    #[test]
    fn test_remaining_millis_never_negative() {
        let now = Utc::now();
        assert_eq!(remaining_millis(now - Duration::seconds(5), now), 0);
        assert_eq!(remaining_millis(now + Duration::seconds(5), now), 5_000);
    }

    #[rstest]
    #[case(0, "0:00")]
    #[case(999, "0:00")]
    #[case(1_000, "0:01")]
    #[case(59_999, "0:59")]
    #[case(60_000, "1:00")]
    #[case(65_000, "1:05")]
    #[case(899_999, "14:59")]
    #[case(900_000, "15:00")]
    fn test_format_lock_time(#[case] millis: u64, #[case] expected: &str) {
        assert_eq!(format_lock_time(millis), expected);
    }

    #[rstest]
    #[case(900, "15 minutes")]
    #[case(120, "2 minutes")]
    #[case(60, "1 minute")]
    #[case(90, "90 seconds")]
    #[case(30, "30 seconds")]
    #[case(1, "1 second")]
    fn test_describe_lock_duration(#[case] secs: i64, #[case] expected: &str) {
        assert_eq!(describe_lock_duration(Duration::seconds(secs)), expected);
    }
}
