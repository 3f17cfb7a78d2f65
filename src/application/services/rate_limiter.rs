//! Sliding-window admission control per client identity and traffic class.

use dashmap::DashMap;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Endpoint class with its own admission budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrafficClass {
    /// Link creation. Small budget protecting the registry write path.
    Write,
    /// Redirect resolution.
    Read,
}

impl fmt::Display for TrafficClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write => f.write_str("write"),
            Self::Read => f.write_str("read"),
        }
    }
}

/// Maximum admissions per trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: usize,
    pub window: Duration,
}

impl RateLimitPolicy {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

/// Monotonic time source for the limiter.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock backed [`Clock`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(|e| e.into_inner());
        self.origin + offset
    }
}

type BucketKey = (String, TrafficClass);

/// Sliding-window rate limiter.
///
/// Each `(identity, class)` bucket keeps the instants of its admitted requests.
/// A check evicts instants older than the window, then admits and records `now`
/// only if fewer than `max_requests` remain.
///
/// # Thread Safety
///
/// Buckets live in a [`DashMap`]; a check holds the bucket's entry for the
/// whole evict-count-record sequence, so concurrent requests for one identity
/// cannot both take the last slot. Different identities do not contend unless
/// they share a shard.
///
/// # Memory
///
/// Eviction is lazy. Call [`Self::sweep`] periodically to drop idle buckets.
pub struct SlidingWindowLimiter {
    write: RateLimitPolicy,
    read: RateLimitPolicy,
    windows: DashMap<BucketKey, VecDeque<Instant>>,
    clock: Arc<dyn Clock>,
}

impl SlidingWindowLimiter {
    /// Creates a limiter using the system clock.
    pub fn new(write: RateLimitPolicy, read: RateLimitPolicy) -> Self {
        Self::with_clock(write, read, Arc::new(SystemClock))
    }

    /// Creates a limiter with an explicit time source.
    pub fn with_clock(write: RateLimitPolicy, read: RateLimitPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            write,
            read,
            windows: DashMap::new(),
            clock,
        }
    }

    /// Returns the policy applied to `class`.
    pub fn policy(&self, class: TrafficClass) -> RateLimitPolicy {
        match class {
            TrafficClass::Write => self.write,
            TrafficClass::Read => self.read,
        }
    }

    /// Admits or rejects one request, recording it when admitted.
    pub fn is_allowed(&self, identity: &str, class: TrafficClass) -> bool {
        let policy = self.policy(class);
        let now = self.clock.now();

        let mut window = self
            .windows
            .entry((identity.to_string(), class))
            .or_default();

        evict_expired(&mut window, now, policy.window);

        if window.len() < policy.max_requests {
            window.push_back(now);
            true
        } else {
            false
        }
    }

    /// Drops buckets with no admissions inside their window.
    ///
    /// Returns the number of buckets removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let before = self.windows.len();

        self.windows.retain(|(_, class), window| {
            evict_expired(window, now, self.policy(*class).window);
            !window.is_empty()
        });

        before.saturating_sub(self.windows.len())
    }

    /// Number of buckets currently held.
    pub fn tracked_buckets(&self) -> usize {
        self.windows.len()
    }
}

fn evict_expired(window: &mut VecDeque<Instant>, now: Instant, span: Duration) {
    while let Some(&oldest) = window.front() {
        if now.saturating_duration_since(oldest) > span {
            window.pop_front();
        } else {
            break;
        }
    }
}
