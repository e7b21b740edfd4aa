//! Exponential backoff with jitter, and cancellable waits
//!
//! The delay before retrying after failed attempt `k` (1-indexed) is
//!
//! ```text
//! base * 2^(k-1) + uniform[0, jitter_max)
//! ```
//!
//! so with the defaults (base 100ms, jitter 100ms) the waits are roughly
//! 100-200ms, 200-300ms, 400-500ms, ... With `jitter_max = 0` the delay is
//! exactly `base * 2^(k-1)`.
//!
//! Waits only suspend the calling thread and never hold a store lock.
//! A [`CancelToken`] can cut a wait short; the coordinator then fails with
//! `Error::InterruptedDuringWait` instead of retrying.

use parking_lot::{Condvar, Mutex};
use rand::Rng;
use slotlock_core::{Error, Result, RetryConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Delay schedule derived from a [`RetryConfig`]
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    base_ms: u64,
    jitter_max_ms: u64,
}

impl Backoff {
    /// Schedule for `config`
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            base_ms: config.base_backoff_ms,
            jitter_max_ms: config.jitter_max_ms,
        }
    }

    /// Deterministic part of the delay after failed attempt `attempt`
    ///
    /// Saturates instead of overflowing for very large attempt numbers.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.max(1) - 1;
        let factor = 2u64.checked_pow(exponent).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_ms.saturating_mul(factor))
    }

    /// Full delay, base plus jitter drawn from `rng`
    pub fn delay_for<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let jitter = if self.jitter_max_ms == 0 {
            0
        } else {
            rng.gen_range(0..self.jitter_max_ms)
        };
        self.base_delay(attempt)
            .saturating_add(Duration::from_millis(jitter))
    }

    /// Suspend the caller for `delay` unless `cancel` fires first
    ///
    /// # Errors
    ///
    /// `Error::InterruptedDuringWait` if the token is or becomes cancelled.
    pub fn wait(&self, delay: Duration, attempt: u32, cancel: &CancelToken) -> Result<()> {
        if cancel.sleep(delay) {
            tracing::warn!(attempt, "backoff wait interrupted");
            return Err(Error::InterruptedDuringWait { attempt });
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: Mutex<bool>,
    cond: Condvar,
}

/// Shared cancellation flag that wakes sleeping waiters
///
/// Clones share the same flag. Once cancelled a token stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelState>,
}

impl CancelToken {
    /// A fresh, uncancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel and wake every waiter
    pub fn cancel(&self) {
        let mut cancelled = self.inner.cancelled.lock();
        *cancelled = true;
        self.inner.cond.notify_all();
    }

    /// Check if the token has been cancelled
    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock()
    }

    /// Block for up to `timeout`
    ///
    /// Returns `true` if the token was cancelled before or during the wait,
    /// `false` if the full timeout elapsed.
    pub fn sleep(&self, timeout: Duration) -> bool {
        let mut cancelled = self.inner.cancelled.lock();
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            // Unrepresentable deadline: only a cancel can end the wait
            while !*cancelled {
                self.inner.cond.wait(&mut cancelled);
            }
            return true;
        };
        while !*cancelled {
            if self
                .inner
                .cond
                .wait_until(&mut cancelled, deadline)
                .timed_out()
            {
                return *cancelled;
            }
        }
        true
    }
}
