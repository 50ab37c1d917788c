//! Token bucket rate limiting keyed by remote operation
//!
//! Each remote operation category owns one [`TokenBucket`] with a fixed rate
//! and burst. Buckets use reservation semantics: `reserve` always takes a
//! token, possibly driving the balance negative, and reports how long the
//! caller must wait before the token becomes valid. A caller that gives up
//! before the wait ends hands the token back with `release`.
//!
//! The registry map is immutable after construction, so lookups never lock;
//! each bucket guards only its own counter.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{Clock, SystemClock};

/// Errors raised by rate limiter operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimitError {
    #[error("no rate limiter registered for operation '{0}'")]
    UnknownKey(String),

    #[error("cancelled while waiting for a '{0}' token")]
    Cancelled(String),

    #[error("invalid rate limiter configuration: {0}")]
    InvalidConfig(String),
}

/// Configuration for token bucket rate limiter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenBucketConfig {
    /// Tokens added per second; may be fractional (e.g. 0.0222)
    pub rate_per_second: f64,
    /// Maximum number of tokens the bucket can hold
    pub burst: u32,
}

impl TokenBucketConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RateLimitError> {
        if !self.rate_per_second.is_finite() || self.rate_per_second <= 0.0 {
            return Err(RateLimitError::InvalidConfig(format!(
                "rate_per_second must be positive, got {}",
                self.rate_per_second
            )));
        }
        if self.burst == 0 {
            return Err(RateLimitError::InvalidConfig("burst must be greater than 0".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket rate limiter for a single operation key
#[derive(Debug)]
pub struct TokenBucket<C: Clock = SystemClock> {
    name: String,
    config: TokenBucketConfig,
    state: Mutex<BucketState>,
    clock: C,
}

impl TokenBucket<SystemClock> {
    /// Create a bucket backed by the system clock, starting full.
    pub fn new(name: impl Into<String>, config: TokenBucketConfig) -> Result<Self, RateLimitError> {
        Self::with_clock(name, config, SystemClock)
    }
}

impl<C: Clock> TokenBucket<C> {
    /// Create a new token bucket with custom clock
    pub fn with_clock(
        name: impl Into<String>,
        config: TokenBucketConfig,
        clock: C,
    ) -> Result<Self, RateLimitError> {
        config.validate()?;
        let state =
            BucketState { tokens: f64::from(config.burst), last_refill: clock.now() };
        Ok(Self { name: name.into(), config, state: Mutex::new(state), clock })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> TokenBucketConfig {
        self.config
    }

    /// Credit tokens for the time elapsed since the last refill.
    ///
    /// A clock reading earlier than `last_refill` is ignored so the balance
    /// never moves backwards.
    fn refill(&self, state: &mut BucketState) {
        let now = self.clock.now();
        if now <= state.last_refill {
            return;
        }
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens =
            (state.tokens + elapsed * self.config.rate_per_second).min(f64::from(self.config.burst));
        state.last_refill = now;
    }

    /// Current balance after refill. Negative while reservations are
    /// outstanding.
    pub fn available_tokens(&self) -> f64 {
        let mut state = self.state.lock();
        self.refill(&mut state);
        state.tokens
    }

    /// Take one token if it is available right now.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();
        self.refill(&mut state);
        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            debug!(bucket = %self.name, tokens = state.tokens, "Rate limit: insufficient tokens");
            false
        }
    }

    /// Reserve one token and return how long to wait before using it.
    pub fn reserve(&self) -> Duration {
        let mut state = self.state.lock();
        self.refill(&mut state);
        state.tokens -= 1.0;
        if state.tokens >= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(-state.tokens / self.config.rate_per_second)
        }
    }

    /// Give back a reserved token that was never used.
    pub fn release(&self) {
        let mut state = self.state.lock();
        self.refill(&mut state);
        state.tokens = (state.tokens + 1.0).min(f64::from(self.config.burst));
    }

    /// Wait for a token, honouring `cancel`.
    ///
    /// On cancellation the reservation is released and
    /// [`RateLimitError::Cancelled`] is returned.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), RateLimitError> {
        if cancel.is_cancelled() {
            return Err(RateLimitError::Cancelled(self.name.clone()));
        }

        let delay = self.reserve();
        if delay.is_zero() {
            return Ok(());
        }

        debug!(bucket = %self.name, wait_ms = delay.as_millis() as u64, "Waiting for rate limit token");

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                self.release();
                debug!(bucket = %self.name, "Rate limit wait cancelled, reservation released");
                Err(RateLimitError::Cancelled(self.name.clone()))
            }
            () = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

/// One independent token bucket per operation key
#[derive(Debug)]
pub struct RateLimiterRegistry<C: Clock = SystemClock> {
    buckets: HashMap<String, TokenBucket<C>>,
}

impl RateLimiterRegistry<SystemClock> {
    /// Build a registry from `(key, rate_per_second, burst)` quotas.
    pub fn from_quotas<'a, I>(quotas: I) -> Result<Self, RateLimitError>
    where
        I: IntoIterator<Item = &'a (&'a str, f64, u32)>,
    {
        Self::from_quotas_with_clock(quotas, SystemClock)
    }
}

impl<C: Clock + Clone> RateLimiterRegistry<C> {
    /// Build a registry whose buckets all read the given clock.
    pub fn from_quotas_with_clock<'a, I>(quotas: I, clock: C) -> Result<Self, RateLimitError>
    where
        I: IntoIterator<Item = &'a (&'a str, f64, u32)>,
    {
        let mut buckets = HashMap::new();
        for &(key, rate_per_second, burst) in quotas {
            let config = TokenBucketConfig { rate_per_second, burst };
            let bucket = TokenBucket::with_clock(key, config, clock.clone())?;
            if buckets.insert(key.to_string(), bucket).is_some() {
                return Err(RateLimitError::InvalidConfig(format!("duplicate key '{key}'")));
            }
        }
        debug!(buckets = buckets.len(), "Rate limiter registry initialised");
        Ok(Self { buckets })
    }
}

impl<C: Clock> RateLimiterRegistry<C> {
    /// Look up the bucket for `key`.
    pub fn bucket(&self, key: &str) -> Result<&TokenBucket<C>, RateLimitError> {
        self.buckets.get(key).ok_or_else(|| RateLimitError::UnknownKey(key.to_string()))
    }

    /// Wait for a token on `key`, honouring `cancel`.
    pub async fn acquire(&self, key: &str, cancel: &CancellationToken) -> Result<(), RateLimitError> {
        self.bucket(key)?.acquire(cancel).await
    }

    pub fn contains(&self, key: &str) -> bool {
        self.buckets.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for resilience::rate_limiter.
    use std::sync::Arc;

    use super::*;
    use crate::resilience::MockClock;

    fn bucket(rate: f64, burst: u32, clock: &MockClock) -> TokenBucket<MockClock> {
        TokenBucket::with_clock(
            "test.op",
            TokenBucketConfig { rate_per_second: rate, burst },
            clock.clone(),
        )
        .unwrap()
    }

    /// Validates the burst then wait scenario.
    ///
    /// Assertions:
    /// - The first `burst` reservations need no wait.
    /// - The next reservation waits one refill period (500ms at 2/s).
    #[test]
    fn test_reserve_within_burst_then_wait() {
        let clock = MockClock::new();
        let limiter = bucket(2.0, 2, &clock);

        assert_eq!(limiter.reserve(), Duration::ZERO);
        assert_eq!(limiter.reserve(), Duration::ZERO);

        let wait = limiter.reserve();
        assert!((wait.as_secs_f64() - 0.5).abs() < 1e-9, "unexpected wait {wait:?}");
    }

    /// Validates the refill cap scenario.
    ///
    /// Assertions:
    /// - Tokens never exceed `burst` no matter how much time passes.
    #[test]
    fn test_refill_caps_at_burst() {
        let clock = MockClock::new();
        let limiter = bucket(5.0, 10, &clock);

        for _ in 0..10 {
            assert!(limiter.try_acquire());
        }
        assert!(!limiter.try_acquire());

        clock.advance_millis(400);
        assert!((limiter.available_tokens() - 2.0).abs() < 1e-9);

        clock.advance(Duration::from_secs(3600));
        assert!((limiter.available_tokens() - 10.0).abs() < 1e-9);
    }

    /// Validates fractional rates such as the feeds quotas.
    ///
    /// Assertions:
    /// - A 0.5/s bucket needs two seconds to mint one token.
    #[test]
    fn test_fractional_rate_refill() {
        let clock = MockClock::new();
        let limiter = bucket(0.5, 1, &clock);

        assert!(limiter.try_acquire());
        clock.advance_millis(1900);
        assert!(!limiter.try_acquire());
        clock.advance_millis(200);
        assert!(limiter.try_acquire());
    }

    /// Validates that release hands a reservation back.
    ///
    /// Assertions:
    /// - Balance returns to its pre-reservation value.
    #[test]
    fn test_release_restores_token() {
        let clock = MockClock::new();
        let limiter = bucket(1.0, 1, &clock);

        assert_eq!(limiter.reserve(), Duration::ZERO);
        assert!(limiter.reserve() > Duration::ZERO);
        assert!((limiter.available_tokens() + 1.0).abs() < 1e-9);

        limiter.release();
        assert!(limiter.available_tokens().abs() < 1e-9);
    }

    /// Validates configuration validation.
    ///
    /// Assertions:
    /// - Zero burst and non-positive rates are rejected.
    #[test]
    fn test_invalid_config_rejected() {
        let zero_burst = TokenBucketConfig { rate_per_second: 1.0, burst: 0 };
        assert!(TokenBucket::new("x", zero_burst).is_err());

        let zero_rate = TokenBucketConfig { rate_per_second: 0.0, burst: 1 };
        assert!(TokenBucket::new("x", zero_rate).is_err());

        let nan_rate = TokenBucketConfig { rate_per_second: f64::NAN, burst: 1 };
        assert!(TokenBucket::new("x", nan_rate).is_err());
    }

    /// Validates registry lookups.
    ///
    /// Assertions:
    /// - Unknown keys fail with `UnknownKey`.
    /// - Duplicate keys are rejected at construction.
    #[tokio::test]
    async fn test_registry_unknown_and_duplicate_keys() {
        let registry = RateLimiterRegistry::from_quotas(&[("a", 1.0, 1)]).unwrap();
        let cancel = CancellationToken::new();

        let err = registry.acquire("missing", &cancel).await.unwrap_err();
        assert_eq!(err, RateLimitError::UnknownKey("missing".into()));

        let dup = RateLimiterRegistry::from_quotas(&[("a", 1.0, 1), ("a", 2.0, 2)]);
        assert!(matches!(dup, Err(RateLimitError::InvalidConfig(_))));
    }

    /// Validates the cancelled wait scenario.
    ///
    /// Assertions:
    /// - The waiter fails with `Cancelled`, not a rate limit error.
    /// - The reservation is returned to the bucket.
    #[tokio::test]
    async fn test_cancel_releases_reservation() {
        let limiter = Arc::new(
            TokenBucket::new("slow.op", TokenBucketConfig { rate_per_second: 0.2, burst: 1 })
                .unwrap(),
        );
        let cancel = CancellationToken::new();

        limiter.acquire(&cancel).await.unwrap();

        let waiter = {
            let limiter = Arc::clone(&limiter);
            let cancel = cancel.clone();
            tokio::spawn(async move { limiter.acquire(&cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
        assert_eq!(result, Err(RateLimitError::Cancelled("slow.op".into())));

        // Without the release the balance would sit near -1.
        assert!(limiter.available_tokens() > -0.5);
    }

    /// Validates that an already-cancelled token never reserves.
    ///
    /// Assertions:
    /// - Balance is untouched.
    #[tokio::test]
    async fn test_precancelled_acquire_takes_nothing() {
        let limiter =
            TokenBucket::new("op", TokenBucketConfig { rate_per_second: 1.0, burst: 1 }).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(limiter.acquire(&cancel).await.is_err());
        assert!(limiter.available_tokens() > 0.99);
    }

    /// Validates the independent keys scenario.
    ///
    /// Assertions:
    /// - A caller blocked on one key does not delay another key.
    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let registry = Arc::new(
            RateLimiterRegistry::from_quotas(&[("slow", 0.1, 1), ("fast", 0.1, 1)]).unwrap(),
        );
        let cancel = CancellationToken::new();

        registry.acquire("slow", &cancel).await.unwrap();

        let blocked_cancel = CancellationToken::new();
        let blocked = {
            let registry = Arc::clone(&registry);
            let blocked_cancel = blocked_cancel.clone();
            tokio::spawn(async move { registry.acquire("slow", &blocked_cancel).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        let fast = tokio::time::timeout(Duration::from_millis(200), registry.acquire("fast", &cancel))
            .await;
        assert!(matches!(fast, Ok(Ok(()))), "fast key was delayed: {fast:?}");
        assert!(!blocked.is_finished());

        blocked_cancel.cancel();
        let blocked_result = blocked.await.unwrap();
        assert!(matches!(blocked_result, Err(RateLimitError::Cancelled(_))));
    }

    /// Validates concurrent access on one bucket.
    ///
    /// Assertions:
    /// - Exactly `burst` of many concurrent callers succeed immediately.
    #[test]
    fn test_concurrent_try_acquire_respects_burst() {
        let clock = MockClock::new();
        let limiter = Arc::new(bucket(1.0, 3, &clock));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || limiter.try_acquire())
            })
            .collect();

        let granted = handles.into_iter().map(|h| h.join().unwrap()).filter(|ok| *ok).count();
        assert_eq!(granted, 3);
    }
}
