//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating registry calls,
//! cache access, validation, and business rules. Services consume the
//! [`crate::domain::repositories::UrlRegistry`] and
//! [`crate::infrastructure::cache::CacheService`] traits and provide a clean
//! API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::shortener_service::ShortenerService`] - Create, resolve, delete and list short links
//! - [`services::rate_limiter::SlidingWindowLimiter`] - Per-client sliding-window admission control

pub mod services;
