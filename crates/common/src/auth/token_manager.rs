//! Token manager with refresh-on-expiry
//!
//! Manages the access token lifecycle:
//! - Serve the cached token while it is inside its validity window
//! - Refresh through [`TokenExchangeClient`] once it is not
//! - Persist a rotated refresh token through [`RefreshTokenStore`] before the
//!   new access token is handed out
//!
//! The whole check-and-refresh runs under one async mutex, so concurrent
//! callers that find the token stale queue behind a single exchange and then
//! read its result from the cache.
//!
//! Once sent, an exchange always runs to completion in its own task, which
//! owns the lock until the result (and any rotated refresh token) is stored.
//! Cancellation only stops the caller from waiting for it.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::traits::{RefreshTokenStore, TokenExchangeClient};
use super::types::{Credential, TokenResponse};

/// Default margin subtracted from `expires_in`.
pub const DEFAULT_SAFETY_MARGIN_SECS: i64 = 300;

/// Error type for token manager operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Token endpoint answered with a non-2xx status
    #[error("token exchange failed with status {status}: {body}")]
    Exchange { status: u16, body: String },

    /// Token endpoint could not be reached
    #[error("token endpoint unreachable: {0}")]
    Transport(String),

    /// Token endpoint answered 2xx with an unusable body
    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    /// Rotated refresh token could not be written to durable storage
    #[error("failed to persist rotated refresh token: {0}")]
    Persist(String),

    #[error("no refresh token configured")]
    MissingRefreshToken,

    #[error("token request cancelled")]
    Cancelled,
}

#[derive(Debug)]
struct TokenState {
    refresh_token: String,
    cached: Option<(String, DateTime<Utc>)>,
}

impl TokenState {
    fn credential(&self) -> Option<Credential> {
        self.cached.as_ref().map(|(access_token, expires_at)| Credential {
            access_token: access_token.clone(),
            expires_at: *expires_at,
            refresh_token: self.refresh_token.clone(),
        })
    }
}

struct Refresher<X, S> {
    client: X,
    store: S,
    safety_margin: Duration,
}

impl<X: TokenExchangeClient, S: RefreshTokenStore> Refresher<X, S> {
    /// Exchange, persist any rotation and cache the new access token.
    async fn run(
        self: Arc<Self>,
        mut state: OwnedMutexGuard<TokenState>,
    ) -> Result<Credential, TokenError> {
        let response = self.client.exchange_refresh_token(&state.refresh_token).await?;
        let (access_token, expires_at, rotated) = self.accept_response(response)?;

        if let Some(new_refresh_token) = rotated.filter(|t| *t != state.refresh_token) {
            if let Err(e) = self.store.persist_refresh_token(&new_refresh_token) {
                warn!(error = %e, "Rotated refresh token could not be persisted");
                return Err(e);
            }
            state.refresh_token = new_refresh_token;
            info!("Refresh token rotated and persisted");
        }

        state.cached = Some((access_token, expires_at));
        info!(expires_at = %expires_at, "Access token refreshed");

        state.credential().ok_or_else(|| TokenError::InvalidResponse("empty cache".to_string()))
    }

    fn accept_response(
        &self,
        response: TokenResponse,
    ) -> Result<(String, DateTime<Utc>, Option<String>), TokenError> {
        if response.access_token.is_empty() {
            return Err(TokenError::InvalidResponse("empty access_token".to_string()));
        }
        if let Some(token_type) = response.token_type.as_deref() {
            if !token_type.eq_ignore_ascii_case("bearer") {
                return Err(TokenError::InvalidResponse(format!(
                    "unsupported token_type {token_type}"
                )));
            }
        }
        let expires_at = expiry_after(Utc::now(), response.expires_in, self.safety_margin)?;
        let rotated = response.refresh_token.filter(|t| !t.is_empty());
        Ok((response.access_token, expires_at, rotated))
    }
}

/// `now + expires_in - margin`, rejecting lifetimes chrono cannot represent.
fn expiry_after(
    now: DateTime<Utc>,
    expires_in: i64,
    margin: Duration,
) -> Result<DateTime<Utc>, TokenError> {
    Duration::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .and_then(|expiry| expiry.checked_sub_signed(margin))
        .ok_or_else(|| TokenError::InvalidResponse(format!("expires_in out of range: {expires_in}")))
}

/// Process-wide owner of the bearer credential.
pub struct TokenLifecycleManager<X: TokenExchangeClient + 'static, S: RefreshTokenStore + 'static> {
    refresher: Arc<Refresher<X, S>>,
    state: Arc<Mutex<TokenState>>,
}

impl<X: TokenExchangeClient + 'static, S: RefreshTokenStore + 'static> TokenLifecycleManager<X, S> {
    /// Create a manager seeded with the configured refresh token.
    ///
    /// # Arguments
    /// * `client` - performs the refresh-token exchange
    /// * `store` - persists rotated refresh tokens
    /// * `refresh_token` - refresh token loaded from configuration
    #[must_use]
    pub fn new(client: X, store: S, refresh_token: impl Into<String>) -> Self {
        Self {
            refresher: Arc::new(Refresher {
                client,
                store,
                safety_margin: Duration::seconds(DEFAULT_SAFETY_MARGIN_SECS),
            }),
            state: Arc::new(Mutex::new(TokenState {
                refresh_token: refresh_token.into(),
                cached: None,
            })),
        }
    }

    /// Current access token, refreshing first if the cached one is stale.
    ///
    /// # Errors
    /// Any [`TokenError`]; the cache is left untouched on failure.
    pub async fn get_access_token(&self, cancel: &CancellationToken) -> Result<String, TokenError> {
        self.get_credential(cancel).await.map(|credential| credential.access_token)
    }

    /// Full credential, refreshing first if the cached one is stale.
    ///
    /// A cancelled caller returns [`TokenError::Cancelled`] at once, but an
    /// exchange already sent keeps running and its result is still cached.
    ///
    /// # Errors
    /// Any [`TokenError`]; the cache is left untouched on failure.
    pub async fn get_credential(&self, cancel: &CancellationToken) -> Result<Credential, TokenError> {
        let state = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(TokenError::Cancelled),
            guard = Arc::clone(&self.state).lock_owned() => guard,
        };

        if let Some(credential) = state.credential() {
            if credential.is_valid_at(Utc::now()) {
                return Ok(credential);
            }
            debug!(expired_at = %credential.expires_at, "Access token stale, refreshing");
        }

        if state.refresh_token.is_empty() {
            return Err(TokenError::MissingRefreshToken);
        }
        if cancel.is_cancelled() {
            return Err(TokenError::Cancelled);
        }

        let refresh = tokio::spawn(Arc::clone(&self.refresher).run(state));
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("Caller cancelled; token exchange continues in the background");
                Err(TokenError::Cancelled)
            }
            joined = refresh => joined
                .map_err(|e| TokenError::Transport(format!("token refresh task failed: {e}")))?,
        }
    }

    /// Cached credential without triggering a refresh.
    pub async fn cached_credential(&self) -> Option<Credential> {
        self.state.lock().await.credential()
    }

    /// Drop the cached access token so the next call refreshes.
    pub async fn invalidate(&self) {
        self.state.lock().await.cached = None;
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::token_manager.
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex as StdMutex};

    use async_trait::async_trait;

    use super::*;

    struct FakeExchanger {
        calls: AtomicUsize,
        expires_in: i64,
        rotate_to: Option<String>,
        fail_status: Option<u16>,
        delay: std::time::Duration,
        seen_refresh_tokens: StdMutex<Vec<String>>,
    }

    impl FakeExchanger {
        fn new(expires_in: i64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                expires_in,
                rotate_to: None,
                fail_status: None,
                delay: std::time::Duration::ZERO,
                seen_refresh_tokens: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TokenExchangeClient for Arc<FakeExchanger> {
        async fn exchange_refresh_token(
            &self,
            refresh_token: &str,
        ) -> Result<TokenResponse, TokenError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.seen_refresh_tokens.lock().unwrap().push(refresh_token.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if let Some(status) = self.fail_status {
                return Err(TokenError::Exchange { status, body: "invalid_grant".into() });
            }
            Ok(TokenResponse {
                access_token: format!("access-{n}"),
                token_type: Some("bearer".into()),
                expires_in: self.expires_in,
                refresh_token: self.rotate_to.clone(),
            })
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        persisted: StdMutex<Vec<String>>,
        fail: bool,
    }

    impl RefreshTokenStore for Arc<MemoryStore> {
        fn persist_refresh_token(&self, refresh_token: &str) -> Result<(), TokenError> {
            if self.fail {
                return Err(TokenError::Persist("read-only filesystem".into()));
            }
            self.persisted.lock().unwrap().push(refresh_token.to_string());
            Ok(())
        }
    }

    fn manager(
        exchanger: &Arc<FakeExchanger>,
        store: &Arc<MemoryStore>,
    ) -> TokenLifecycleManager<Arc<FakeExchanger>, Arc<MemoryStore>> {
        TokenLifecycleManager::new(Arc::clone(exchanger), Arc::clone(store), "refresh-0")
    }

    /// Validates the thundering herd scenario.
    ///
    /// Assertions:
    /// - Sixteen concurrent callers cause exactly one exchange.
    /// - Every caller receives the same access token.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_refresh() {
        let mut fake = FakeExchanger::new(3600);
        fake.delay = std::time::Duration::from_millis(50);
        let exchanger = Arc::new(fake);
        let store = Arc::new(MemoryStore::default());
        let manager = Arc::new(manager(&exchanger, &store));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move {
                    manager.get_access_token(&CancellationToken::new()).await
                })
            })
            .collect();

        for handle in futures::future::join_all(handles).await {
            assert_eq!(handle.unwrap().unwrap(), "access-1");
        }
        assert_eq!(exchanger.calls.load(Ordering::SeqCst), 1);
    }

    /// Validates the cached fast path.
    ///
    /// Assertions:
    /// - Sequential calls inside the validity window reuse the token.
    /// - `expires_at` is `expires_in` minus the 300s margin.
    #[tokio::test]
    async fn test_cached_token_reused() {
        let exchanger = Arc::new(FakeExchanger::new(3600));
        let store = Arc::new(MemoryStore::default());
        let manager = manager(&exchanger, &store);
        let cancel = CancellationToken::new();

        let first = manager.get_credential(&cancel).await.unwrap();
        let second = manager.get_credential(&cancel).await.unwrap();

        assert_eq!(first.access_token, second.access_token);
        assert_eq!(exchanger.calls.load(Ordering::SeqCst), 1);

        let remaining = first.seconds_until_expiry();
        assert!((3290..=3300).contains(&remaining), "remaining {remaining}");
    }

    /// Validates that a lifetime inside the margin is never cached as valid.
    ///
    /// Assertions:
    /// - Each call refreshes when `expires_in` is 300s.
    #[tokio::test]
    async fn test_short_lived_token_refreshes_every_call() {
        let exchanger = Arc::new(FakeExchanger::new(300));
        let store = Arc::new(MemoryStore::default());
        let manager = manager(&exchanger, &store);
        let cancel = CancellationToken::new();

        assert_eq!(manager.get_access_token(&cancel).await.unwrap(), "access-1");
        assert_eq!(manager.get_access_token(&cancel).await.unwrap(), "access-2");
        assert_eq!(exchanger.calls.load(Ordering::SeqCst), 2);
    }

    /// Validates the refresh token rotation scenario.
    ///
    /// Assertions:
    /// - The rotated token is persisted exactly once.
    /// - The next exchange presents the rotated token.
    #[tokio::test]
    async fn test_rotated_refresh_token_persisted_and_used() {
        let mut fake = FakeExchanger::new(300);
        fake.rotate_to = Some("refresh-1".into());
        let exchanger = Arc::new(fake);
        let store = Arc::new(MemoryStore::default());
        let manager = manager(&exchanger, &store);
        let cancel = CancellationToken::new();

        manager.get_access_token(&cancel).await.unwrap();
        manager.get_access_token(&cancel).await.unwrap();

        assert_eq!(*store.persisted.lock().unwrap(), vec!["refresh-1".to_string()]);
        assert_eq!(
            *exchanger.seen_refresh_tokens.lock().unwrap(),
            vec!["refresh-0".to_string(), "refresh-1".to_string()]
        );
    }

    /// Validates that a failed persist withholds the new token.
    ///
    /// Assertions:
    /// - The call fails with `Persist`.
    /// - Nothing is cached.
    #[tokio::test]
    async fn test_persist_failure_withholds_token() {
        let mut fake = FakeExchanger::new(3600);
        fake.rotate_to = Some("refresh-1".into());
        let exchanger = Arc::new(fake);
        let store = Arc::new(MemoryStore { persisted: StdMutex::default(), fail: true });
        let manager = manager(&exchanger, &store);

        let err = manager.get_access_token(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, TokenError::Persist(_)));
        assert!(manager.cached_credential().await.is_none());
    }

    /// Validates exchange failures surface unchanged.
    ///
    /// Assertions:
    /// - Error carries the endpoint status.
    #[tokio::test]
    async fn test_exchange_failure_surfaces_status() {
        let mut fake = FakeExchanger::new(3600);
        fake.fail_status = Some(400);
        let exchanger = Arc::new(fake);
        let store = Arc::new(MemoryStore::default());
        let manager = manager(&exchanger, &store);

        let err = manager.get_access_token(&CancellationToken::new()).await.unwrap_err();
        assert_eq!(err, TokenError::Exchange { status: 400, body: "invalid_grant".into() });
    }

    /// Validates cancellation during a slow exchange.
    ///
    /// Assertions:
    /// - Caller receives `Cancelled` promptly.
    #[tokio::test]
    async fn test_cancel_during_refresh() {
        let mut fake = FakeExchanger::new(3600);
        fake.delay = std::time::Duration::from_secs(5);
        let exchanger = Arc::new(fake);
        let store = Arc::new(MemoryStore::default());
        let manager = manager(&exchanger, &store);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            manager.get_access_token(&cancel),
        )
        .await
        .unwrap();
        assert_eq!(result, Err(TokenError::Cancelled));
    }

    /// Validates that cancelling mid-exchange does not lose a rotation.
    ///
    /// Assertions:
    /// - The cancelled caller receives `Cancelled`.
    /// - The rotated token is persisted anyway.
    /// - The next exchange presents the rotated token.
    #[tokio::test]
    async fn test_cancel_mid_exchange_keeps_rotated_token() {
        let mut fake = FakeExchanger::new(300);
        fake.rotate_to = Some("refresh-1".into());
        fake.delay = std::time::Duration::from_millis(200);
        let exchanger = Arc::new(fake);
        let store = Arc::new(MemoryStore::default());
        let manager = manager(&exchanger, &store);

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            trigger.cancel();
        });
        assert_eq!(manager.get_access_token(&cancel).await, Err(TokenError::Cancelled));

        let next = manager.get_credential(&CancellationToken::new()).await.unwrap();
        assert_eq!(next.access_token, "access-2");
        assert_eq!(*store.persisted.lock().unwrap(), vec!["refresh-1".to_string()]);
        assert_eq!(
            *exchanger.seen_refresh_tokens.lock().unwrap(),
            vec!["refresh-0".to_string(), "refresh-1".to_string()]
        );
    }

    /// Validates that an already-cancelled caller sends nothing.
    ///
    /// Assertions:
    /// - No exchange is attempted.
    #[tokio::test]
    async fn test_cancelled_before_refresh_sends_nothing() {
        let exchanger = Arc::new(FakeExchanger::new(3600));
        let store = Arc::new(MemoryStore::default());
        let manager = manager(&exchanger, &store);

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(manager.get_access_token(&cancel).await, Err(TokenError::Cancelled));
        assert_eq!(exchanger.calls.load(Ordering::SeqCst), 0);
    }

    /// Validates that an absurd lifetime is rejected instead of overflowing.
    ///
    /// Assertions:
    /// - `expires_in` of 1e17 seconds is `InvalidResponse`.
    /// - Nothing is cached.
    #[tokio::test]
    async fn test_out_of_range_expires_in_is_invalid_response() {
        let exchanger = Arc::new(FakeExchanger::new(100_000_000_000_000_000));
        let store = Arc::new(MemoryStore::default());
        let manager = manager(&exchanger, &store);

        let err = manager.get_access_token(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, TokenError::InvalidResponse(_)), "got {err:?}");
        assert!(manager.cached_credential().await.is_none());
    }

    #[test]
    fn expiry_subtracts_margin() {
        let now = Utc::now();
        let expiry = expiry_after(now, 3600, Duration::seconds(300)).unwrap();
        assert_eq!(expiry - now, Duration::seconds(3300));
        assert!(expiry_after(now, i64::MAX, Duration::seconds(300)).is_err());
        assert!(expiry_after(now, i64::MIN, Duration::seconds(300)).is_err());
    }

    /// Validates `invalidate` forces a refresh.
    ///
    /// Assertions:
    /// - A second exchange happens after invalidation.
    #[tokio::test]
    async fn test_invalidate_forces_refresh() {
        let exchanger = Arc::new(FakeExchanger::new(3600));
        let store = Arc::new(MemoryStore::default());
        let manager = manager(&exchanger, &store);
        let cancel = CancellationToken::new();

        manager.get_access_token(&cancel).await.unwrap();
        manager.invalidate().await;
        assert_eq!(manager.get_access_token(&cancel).await.unwrap(), "access-2");
    }
}
