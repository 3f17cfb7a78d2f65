//! Business logic services for the application layer.

pub mod rate_limiter;
pub mod shortener_service;

pub use rate_limiter::{
    Clock, ManualClock, RateLimitPolicy, SlidingWindowLimiter, SystemClock, TrafficClass,
};
pub use shortener_service::{
    CreateOutcome, DEFAULT_EXPIRES_IN_DAYS, MAX_EXPIRES_IN_DAYS, ShortenerService,
    ShortenerSettings, UrlPage,
};
