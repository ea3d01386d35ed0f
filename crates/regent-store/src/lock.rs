//! The advisory write lock serializing spec mutations.
//!
//! Multiple service replicas may race to apply mutations; the lock is a
//! single advisory row/key in the shared store (`SELECT … FOR UPDATE` or
//! equivalent), so it excludes writers across processes and machines.
//! `InMemoryWriteLock` is the single-process reference implementation.
//!
//! Acquisition is try-based with bounded linear backoff; exhausting the
//! retry budget surfaces `LockContention` and leaves the caller free to
//! retry the whole operation later.

use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, warn};

use regent_contracts::error::{RegentError, RegentResult};

/// Mutual exclusion over the spec store write path.
pub trait WriteLock: Send + Sync {
    /// Attempt to take the lock without blocking. Returns true on success.
    fn try_acquire(&self) -> bool;

    /// Release a previously acquired lock.
    fn release(&self);
}

/// RAII guard returned by `acquire_with_retry`; releases on drop.
pub struct LockGuard<'a> {
    lock: &'a dyn WriteLock,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}

/// Acquire `lock` with up to `max_attempts` tries and linear backoff.
///
/// Sleeps `backoff * attempt` between tries. Returns `LockContention`
/// after the budget is exhausted — the caller's state is untouched and the
/// operation may simply be retried.
pub fn acquire_with_retry<'a>(
    lock: &'a dyn WriteLock,
    max_attempts: u32,
    backoff: Duration,
) -> RegentResult<LockGuard<'a>> {
    for attempt in 1..=max_attempts {
        if lock.try_acquire() {
            debug!(attempt, "write lock acquired");
            return Ok(LockGuard { lock });
        }
        if attempt < max_attempts {
            warn!(attempt, "write lock contended, backing off");
            std::thread::sleep(backoff * attempt);
        }
    }
    Err(RegentError::LockContention { attempts: max_attempts })
}

/// Single-process advisory lock backed by a `Mutex<bool>`.
pub struct InMemoryWriteLock {
    held: Mutex<bool>,
}

impl InMemoryWriteLock {
    pub fn new() -> Self {
        Self { held: Mutex::new(false) }
    }
}

impl Default for InMemoryWriteLock {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteLock for InMemoryWriteLock {
    fn try_acquire(&self) -> bool {
        let mut held = match self.held.lock() {
            Ok(guard) => guard,
            Err(_) => return false,
        };
        if *held {
            false
        } else {
            *held = true;
            true
        }
    }

    fn release(&self) {
        if let Ok(mut held) = self.held.lock() {
            *held = false;
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_succeeds_when_uncontended() {
        let lock = InMemoryWriteLock::new();
        let guard = acquire_with_retry(&lock, 3, Duration::from_millis(1));
        assert!(guard.is_ok());
    }

    #[test]
    fn second_acquire_fails_while_held() {
        let lock = InMemoryWriteLock::new();
        let _guard = acquire_with_retry(&lock, 1, Duration::from_millis(1)).unwrap();

        let contended = acquire_with_retry(&lock, 2, Duration::from_millis(1));
        assert!(matches!(
            contended,
            Err(RegentError::LockContention { attempts: 2 })
        ));
    }

    #[test]
    fn dropping_the_guard_releases_the_lock() {
        let lock = InMemoryWriteLock::new();
        {
            let _guard = acquire_with_retry(&lock, 1, Duration::from_millis(1)).unwrap();
        }
        assert!(lock.try_acquire());
        lock.release();
    }
}
