//! Login attempt tracking with escalating lockout.
//!
//! Process-local and volatile: the counter map starts empty at boot and is
//! never persisted, so a restart clears all lockouts. Counters are keyed by
//! username and guarded by the map's entry API, so concurrent failures for
//! one username cannot lose increments.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

/// One username's failure state.
#[derive(Debug, Clone)]
struct AttemptRecord {
    /// Consecutive failed attempts.
    attempts: u32,
    /// Locked until this time, if a lockout is in effect.
    locked_until: Option<DateTime<Utc>>,
}

/// Result of a lockout check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockStatus {
    /// Whether the account is currently locked.
    pub locked: bool,
    /// Minutes until the lock expires, rounded up. Zero when unlocked.
    pub remaining_minutes: i64,
}

impl LockStatus {
    /// An unlocked status.
    pub fn unlocked() -> Self {
        Self {
            locked: false,
            remaining_minutes: 0,
        }
    }
}

/// Result of recording a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureRecord {
    /// Total consecutive failures including this one.
    pub attempts: u32,
    /// Lockout duration triggered by this failure; zero if none.
    pub lockout_minutes: u64,
}

/// Maps a failure count to a lockout duration in minutes.
fn lockout_duration_minutes(attempts: u32) -> u64 {
    match attempts {
        0..=2 => 0,
        3 => 5,
        4 => 15,
        5 => 30,
        _ => 60,
    }
}

/// Tracks failed login attempts per username and enforces escalating
/// lockouts.
#[derive(Debug, Default)]
pub struct LoginAttemptGuard {
    /// Username → failure record.
    attempts: DashMap<String, AttemptRecord>,
}

impl LoginAttemptGuard {
    /// Creates an empty guard.
    pub fn new() -> Self {
        Self {
            attempts: DashMap::new(),
        }
    }

    /// Checks whether a username is currently locked out.
    ///
    /// An expired `locked_until` counts as unlocked even before the sweeper
    /// removes the entry.
    pub fn check_lockout(&self, username: &str, now: DateTime<Utc>) -> LockStatus {
        let Some(record) = self.attempts.get(username) else {
            return LockStatus::unlocked();
        };

        if let Some(locked_until) = record.locked_until {
            if now < locked_until {
                let remaining_ms = (locked_until - now).num_milliseconds();
                return LockStatus {
                    locked: true,
                    remaining_minutes: (remaining_ms + 59_999) / 60_000,
                };
            }
        }

        LockStatus::unlocked()
    }

    /// Records a failed login attempt and applies the lockout schedule.
    pub fn record_failure(&self, username: &str, now: DateTime<Utc>) -> FailureRecord {
        let mut entry = self
            .attempts
            .entry(username.to_string())
            .or_insert(AttemptRecord {
                attempts: 0,
                locked_until: None,
            });

        entry.attempts += 1;
        let lockout_minutes = lockout_duration_minutes(entry.attempts);
        if lockout_minutes > 0 {
            entry.locked_until = Some(now + Duration::minutes(lockout_minutes as i64));
        }

        FailureRecord {
            attempts: entry.attempts,
            lockout_minutes,
        }
    }

    /// Clears a username's failure record after a successful login.
    pub fn reset(&self, username: &str) {
        self.attempts.remove(username);
    }

    /// Removes entries whose lockout has expired. Cache hygiene only:
    /// `check_lockout` already treats expired locks as unlocked.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.attempts.len();
        self.attempts
            .retain(|_, record| match record.locked_until {
                Some(locked_until) => now <= locked_until,
                None => true,
            });
        before - self.attempts.len()
    }

    /// Spawns the periodic sweep task. Not started under test
    /// configuration.
    pub fn spawn_sweeper(self: Arc<Self>, interval_seconds: u64) -> tokio::task::JoinHandle<()> {
        let guard = self;
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(std::time::Duration::from_secs(interval_seconds));
            ticker.tick().await; // first tick completes immediately
            loop {
                ticker.tick().await;
                let removed = guard.sweep_expired(Utc::now());
                if removed > 0 {
                    debug!(removed, "Swept expired lockout records");
                }
            }
        })
    }

    /// Number of tracked usernames (for tests and diagnostics).
    pub fn tracked_count(&self) -> usize {
        self.attempts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_schedule_escalation() {
        let guard = LoginAttemptGuard::new();
        let t = now();

        assert_eq!(guard.record_failure("alice", t).lockout_minutes, 0);
        assert_eq!(guard.record_failure("alice", t).lockout_minutes, 0);
        assert!(!guard.check_lockout("alice", t).locked);

        assert_eq!(guard.record_failure("alice", t).lockout_minutes, 5);
        assert_eq!(guard.record_failure("alice", t).lockout_minutes, 15);
        assert_eq!(guard.record_failure("alice", t).lockout_minutes, 30);
        assert_eq!(guard.record_failure("alice", t).lockout_minutes, 60);
        assert_eq!(guard.record_failure("alice", t).lockout_minutes, 60);
    }

    #[test]
    fn test_third_failure_locks_five_minutes() {
        let guard = LoginAttemptGuard::new();
        let t = now();
        for _ in 0..3 {
            guard.record_failure("alice", t);
        }

        let status = guard.check_lockout("alice", t);
        assert!(status.locked);
        assert_eq!(status.remaining_minutes, 5);
    }

    #[test]
    fn test_lock_expires_without_sweep() {
        let guard = LoginAttemptGuard::new();
        let t = now();
        for _ in 0..3 {
            guard.record_failure("alice", t);
        }

        assert!(guard.check_lockout("alice", t).locked);
        assert!(
            !guard
                .check_lockout("alice", t + Duration::minutes(5))
                .locked
        );
    }

    #[test]
    fn test_reset_clears_record() {
        let guard = LoginAttemptGuard::new();
        let t = now();
        for _ in 0..4 {
            guard.record_failure("alice", t);
        }

        guard.reset("alice");
        assert!(!guard.check_lockout("alice", t).locked);
        // Counting starts over after a reset
        assert_eq!(guard.record_failure("alice", t).attempts, 1);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let guard = LoginAttemptGuard::new();
        let t = now();
        for _ in 0..3 {
            guard.record_failure("alice", t);
        }
        guard.record_failure("bob", t); // no lockout yet

        let removed = guard.sweep_expired(t + Duration::minutes(6));
        assert_eq!(removed, 1);
        assert_eq!(guard.tracked_count(), 1);
    }

    #[test]
    fn test_remaining_minutes_rounds_up() {
        let guard = LoginAttemptGuard::new();
        let t = now();
        for _ in 0..3 {
            guard.record_failure("alice", t);
        }

        let status = guard.check_lockout("alice", t + Duration::seconds(30));
        assert!(status.locked);
        assert_eq!(status.remaining_minutes, 5);
    }
}
