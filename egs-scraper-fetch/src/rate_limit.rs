//! Fixed-window rate limiting for catalog requests.
//!
//! A [`FixedWindowRateLimiter`] hands out `permits` leases per `window`. Once
//! the window is used up, callers queue in arrival order until the window
//! rolls over. The queue is bounded; a caller arriving at a full queue is
//! rejected immediately instead of waiting.
//!
//! Leases are never released. The window simply resets after it elapses.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::RateLimitError;

/// Default permits per window.
pub const DEFAULT_PERMITS: u32 = 10;

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(1);

/// Default number of callers allowed to queue.
pub const DEFAULT_QUEUE_LIMIT: usize = 100;

// ============================================================================
// Configuration
// ============================================================================

/// Rate limiter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Leases granted per window.
    pub permits: u32,
    /// Window length.
    pub window: Duration,
    /// Maximum number of queued callers.
    pub queue_limit: usize,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            permits: DEFAULT_PERMITS,
            window: DEFAULT_WINDOW,
            queue_limit: DEFAULT_QUEUE_LIMIT,
        }
    }
}

// ============================================================================
// Trait
// ============================================================================

/// Proof that a caller was allowed through the limiter.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitLease {
    granted_at: Instant,
}

impl RateLimitLease {
    fn new() -> Self {
        Self {
            granted_at: Instant::now(),
        }
    }

    /// When the lease was granted.
    pub fn granted_at(&self) -> Instant {
        self.granted_at
    }
}

/// Scheduling gate shared by everything that calls the catalog API.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Waits for a lease.
    ///
    /// Fails with [`RateLimitError::Cancelled`] if `cancel` fires first, or
    /// with [`RateLimitError::QueueFull`] if the wait queue is at capacity.
    async fn acquire(&self, cancel: &CancellationToken) -> Result<RateLimitLease, RateLimitError>;
}

// ============================================================================
// Fixed Window Limiter
// ============================================================================

#[derive(Debug)]
struct WindowState {
    started: Instant,
    used: u32,
}

/// Fixed-window limiter with a bounded FIFO wait queue.
#[derive(Debug)]
pub struct FixedWindowRateLimiter {
    config: RateLimiterConfig,
    // tokio's mutex is fair, so lock order is the queue order.
    state: Mutex<WindowState>,
    waiting: AtomicUsize,
}

/// Decrements the waiter count when a queued caller leaves, however it leaves.
struct WaitingGuard<'a>(&'a AtomicUsize);

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FixedWindowRateLimiter {
    /// Creates a limiter. A zero permit count is treated as one.
    pub fn new(config: RateLimiterConfig) -> Self {
        let config = RateLimiterConfig {
            permits: config.permits.max(1),
            ..config
        };

        Self {
            config,
            state: Mutex::new(WindowState {
                started: Instant::now(),
                used: 0,
            }),
            waiting: AtomicUsize::new(0),
        }
    }

    /// Returns the effective configuration.
    pub fn config(&self) -> RateLimiterConfig {
        self.config
    }

    /// Number of callers currently queued.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Takes a permit from the current window, or returns when the next
    /// window opens.
    fn try_take(&self, state: &mut WindowState, now: Instant) -> Result<RateLimitLease, Instant> {
        if now.duration_since(state.started) >= self.config.window {
            trace!("Rate limit window rolled over");
            state.started = now;
            state.used = 0;
        }

        if state.used < self.config.permits {
            state.used += 1;
            Ok(RateLimitLease::new())
        } else {
            Err(state.started + self.config.window)
        }
    }

    async fn wait_for_permit(&self) -> RateLimitLease {
        let mut state = self.state.lock().await;
        loop {
            match self.try_take(&mut state, Instant::now()) {
                Ok(lease) => return lease,
                Err(next_window) => {
                    debug!(wait_ms = %next_window.saturating_duration_since(Instant::now()).as_millis(), "Waiting for rate limit window");
                    sleep_until(next_window).await;
                }
            }
        }
    }
}

impl Default for FixedWindowRateLimiter {
    fn default() -> Self {
        Self::new(RateLimiterConfig::default())
    }
}

#[async_trait]
impl RateLimiter for FixedWindowRateLimiter {
    async fn acquire(&self, cancel: &CancellationToken) -> Result<RateLimitLease, RateLimitError> {
        if cancel.is_cancelled() {
            return Err(RateLimitError::Cancelled);
        }

        // Fast path. try_lock fails while anyone is queued, so this never
        // overtakes a waiter.
        if let Ok(mut state) = self.state.try_lock() {
            if let Ok(lease) = self.try_take(&mut state, Instant::now()) {
                return Ok(lease);
            }
        }

        let ahead = self.waiting.fetch_add(1, Ordering::SeqCst);
        let _guard = WaitingGuard(&self.waiting);
        if ahead >= self.config.queue_limit {
            debug!(limit = self.config.queue_limit, "Rate limiter queue full");
            return Err(RateLimitError::QueueFull {
                limit: self.config.queue_limit,
            });
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(RateLimitError::Cancelled),
            lease = self.wait_for_permit() => Ok(lease),
        }
    }
}

// ============================================================================
// Unlimited Limiter
// ============================================================================

/// Pass-through limiter that only counts acquisitions.
#[derive(Debug, Default)]
pub struct UnlimitedRateLimiter {
    acquired: AtomicU64,
}

impl UnlimitedRateLimiter {
    /// Creates a new pass-through limiter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of leases handed out so far.
    pub fn acquired(&self) -> u64 {
        self.acquired.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateLimiter for UnlimitedRateLimiter {
    async fn acquire(&self, cancel: &CancellationToken) -> Result<RateLimitLease, RateLimitError> {
        if cancel.is_cancelled() {
            return Err(RateLimitError::Cancelled);
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(RateLimitLease::new())
    }
}

// ============================================================================
// Tests
// ============================================================================
