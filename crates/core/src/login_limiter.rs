//! Failed-login tracking keyed by client address and username.
//!
//! A key is locked out once it accumulates `max_attempts` failures and its
//! most recent failure is still inside the lockout window. The map is
//! bounded: stale entries are swept, and when the tracker is full the key
//! with the oldest failure is evicted to make room.

use std::collections::HashMap;

use chrono::Duration;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Failures allowed before a key is locked out.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Rolling lockout window in seconds.
pub const DEFAULT_LOCKOUT_SECS: i64 = 300;

/// Upper bound on tracked keys.
pub const DEFAULT_MAX_TRACKED_KEYS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AttemptRecord {
    failures: u32,
    last_failure: Timestamp,
}

#[derive(Debug)]
pub struct LoginAttemptTracker {
    attempts: HashMap<String, AttemptRecord>,
    max_attempts: u32,
    lockout: Duration,
    capacity: usize,
}

impl Default for LoginAttemptTracker {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            Duration::seconds(DEFAULT_LOCKOUT_SECS),
            DEFAULT_MAX_TRACKED_KEYS,
        )
    }
}

impl LoginAttemptTracker {
    pub fn new(max_attempts: u32, lockout: Duration, capacity: usize) -> Self {
        Self {
            attempts: HashMap::new(),
            max_attempts: max_attempts.max(1),
            lockout,
            capacity: capacity.max(1),
        }
    }

    /// Tracker key for a login attempt. Usernames are compared
    /// case-insensitively.
    pub fn key(client: &str, username: &str) -> String {
        format!("{client}:{}", username.trim().to_lowercase())
    }

    /// Return [`CoreError::RateLimited`] if `key` is currently locked out.
    pub fn check(&self, key: &str, now: Timestamp) -> Result<(), CoreError> {
        let Some(record) = self.attempts.get(key) else {
            return Ok(());
        };
        let unlocks_at = record.last_failure + self.lockout;
        if record.failures >= self.max_attempts && now < unlocks_at {
            let remaining = (unlocks_at - now).num_seconds().max(1);
            return Err(CoreError::RateLimited {
                retry_after_secs: remaining as u64,
            });
        }
        Ok(())
    }

    /// Check `key` and count this attempt as a failure before the
    /// credentials are verified, all under one borrow. A successful login
    /// clears the record with [`Self::record_success`]; an attempt that ends
    /// without a credential verdict is handed back with [`Self::refund`].
    pub fn reserve(&mut self, key: &str, now: Timestamp) -> Result<(), CoreError> {
        self.check(key, now)?;
        self.record_failure(key, now);
        Ok(())
    }

    /// Return one reserved attempt.
    pub fn refund(&mut self, key: &str) {
        if let Some(record) = self.attempts.get_mut(key) {
            record.failures = record.failures.saturating_sub(1);
            if record.failures == 0 {
                self.attempts.remove(key);
            }
        }
    }

    /// Record a failed attempt. A record whose last failure fell outside
    /// the window starts counting again from one.
    pub fn record_failure(&mut self, key: &str, now: Timestamp) {
        if !self.attempts.contains_key(key) && self.attempts.len() >= self.capacity {
            self.make_room(now);
        }

        let lockout = self.lockout;
        let record = self
            .attempts
            .entry(key.to_string())
            .or_insert(AttemptRecord {
                failures: 0,
                last_failure: now,
            });
        if now - record.last_failure >= lockout {
            record.failures = 0;
        }
        record.failures += 1;
        record.last_failure = now;
    }

    /// Forget a key after a successful login.
    pub fn record_success(&mut self, key: &str) {
        self.attempts.remove(key);
    }

    /// Drop every record whose last failure is older than the window.
    /// Returns the number of records removed.
    pub fn sweep(&mut self, now: Timestamp) -> usize {
        let before = self.attempts.len();
        let lockout = self.lockout;
        self.attempts
            .retain(|_, record| now - record.last_failure < lockout);
        before - self.attempts.len()
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    fn make_room(&mut self, now: Timestamp) {
        if self.sweep(now) > 0 {
            return;
        }
        let oldest = self
            .attempts
            .iter()
            .min_by_key(|(_, record)| record.last_failure)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.attempts.remove(&key);
        }
    }
}
