//! Modular common utilities shared across SellerDesk crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `runtime`: async infrastructure (clock, token buckets, rate limiter
//!   registry)
//! - `platform`: platform integrations (OAuth token lifecycle, SQLite
//!   storage)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Platform tier
// -------------------------------------------------------------------
#[cfg(feature = "platform")]
pub mod auth;
#[cfg(feature = "platform")]
pub mod storage;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "platform")]
pub use auth::{Credential, TokenError, TokenLifecycleManager};
#[cfg(feature = "runtime")]
pub use resilience::{
    Clock, MockClock, RateLimitError, RateLimiterRegistry, SystemClock, TokenBucket,
    TokenBucketConfig,
};
#[cfg(feature = "platform")]
pub use storage::{StorageError, StorageResult};
