//! Resilience patterns for throttling outbound calls
//!
//! - **Clock**: time abstraction so bucket arithmetic is testable
//! - **Rate Limiter**: per-operation token buckets with cancelable waits

pub mod clock;
pub mod rate_limiter;

pub use clock::{Clock, MockClock, SystemClock};
pub use rate_limiter::{RateLimitError, RateLimiterRegistry, TokenBucket, TokenBucketConfig};
