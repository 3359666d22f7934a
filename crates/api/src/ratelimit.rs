//! Per-actor request rate limiting.
//!
//! The limiter is an injected collaborator behind the [`RateLimiter`]
//! trait: handlers only see `AppState::rate_limiter`. The default
//! [`FixedWindowLimiter`] keeps its windows in process memory, which is
//! correct for a single replica; multi-replica deployments substitute an
//! implementation backed by a shared store without touching handler code.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use leadbook_core::types::DbId;

/// The operation class being limited. Windows follow the original
/// dashboard's budget: reads are generous, mutations tighter, imports
/// tightest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitScope {
    /// Read/list/export traffic: 100 requests per 15 minutes.
    General,
    /// Create/update traffic: 10 requests per minute.
    Mutation,
    /// Bulk imports: 5 requests per hour.
    Import,
}

impl RateLimitScope {
    /// `(window, max_requests)` for this scope.
    pub fn limits(self) -> (Duration, u32) {
        match self {
            Self::General => (Duration::from_secs(15 * 60), 100),
            Self::Mutation => (Duration::from_secs(60), 10),
            Self::Import => (Duration::from_secs(60 * 60), 5),
        }
    }
}

/// Outcome of counting one request against a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Seconds until the window resets; meaningful when `allowed` is false.
    pub retry_after_secs: u64,
}

/// Injected rate-limiter collaborator, keyed by actor and scope.
pub trait RateLimiter: Send + Sync {
    /// Count one request and decide whether it may proceed.
    fn check(&self, actor_id: DbId, scope: RateLimitScope) -> RateLimitDecision;
}

// ---------------------------------------------------------------------------
// Fixed-window implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

/// In-process fixed-window limiter.
///
/// Expired windows are replaced on next access, so the map holds at most
/// one entry per (actor, scope) pair that has been seen.
#[derive(Default)]
pub struct FixedWindowLimiter {
    windows: Mutex<HashMap<(DbId, RateLimitScope), WindowEntry>>,
}

impl FixedWindowLimiter {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Count one request against `entry`, starting a fresh window when the
/// current one has expired.
fn apply(
    entry: &mut WindowEntry,
    now: Instant,
    window: Duration,
    max_requests: u32,
) -> RateLimitDecision {
    if now >= entry.reset_at {
        *entry = WindowEntry {
            count: 0,
            reset_at: now + window,
        };
    }

    entry.count += 1;

    RateLimitDecision {
        allowed: entry.count <= max_requests,
        remaining: max_requests.saturating_sub(entry.count),
        retry_after_secs: entry.reset_at.saturating_duration_since(now).as_secs(),
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn check(&self, actor_id: DbId, scope: RateLimitScope) -> RateLimitDecision {
        let (window, max_requests) = scope.limits();
        let now = Instant::now();

        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = windows.entry((actor_id, scope)).or_insert(WindowEntry {
            count: 0,
            reset_at: now + window,
        });

        apply(entry, now, window, max_requests)
    }
}

/// A limiter that allows everything. Used when `RATE_LIMITING_ENABLED` is
/// off and in most integration tests.
pub struct NoopLimiter;

impl RateLimiter for NoopLimiter {
    fn check(&self, _actor_id: DbId, scope: RateLimitScope) -> RateLimitDecision {
        let (_, max_requests) = scope.limits();
        RateLimitDecision {
            allowed: true,
            remaining: max_requests,
            retry_after_secs: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
