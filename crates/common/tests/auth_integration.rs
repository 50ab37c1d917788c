//! Integration tests for the token lifecycle manager
//!
//! Uses file-backed and in-memory port implementations to check rotation and
//! single-flight behavior through the public API only.

#![cfg(feature = "platform")]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sellerdesk_common::auth::{
    RefreshTokenStore, TokenError, TokenExchangeClient, TokenLifecycleManager, TokenResponse,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Exchanger that rotates the refresh token on every call.
struct RotatingExchanger {
    calls: AtomicUsize,
}

/// Local handle so the shared exchanger satisfies the orphan rule.
struct SharedExchanger(Arc<RotatingExchanger>);

#[async_trait]
impl TokenExchangeClient for SharedExchanger {
    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, TokenError> {
        let n = self.0.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok(TokenResponse {
            access_token: format!("access-{n}-from-{refresh_token}"),
            token_type: Some("bearer".to_string()),
            expires_in: 300,
            refresh_token: Some(format!("refresh-{n}")),
        })
    }
}

/// Store that writes the token to a plain file.
struct FileStore {
    path: PathBuf,
}

impl RefreshTokenStore for FileStore {
    fn persist_refresh_token(&self, refresh_token: &str) -> Result<(), TokenError> {
        std::fs::write(&self.path, refresh_token).map_err(|e| TokenError::Persist(e.to_string()))
    }
}

/// Validates rotation is durable before the access token is returned.
///
/// # Test Steps
/// 1. Configure a 300s lifetime so every call refreshes
/// 2. Call twice
/// 3. Verify the file holds the latest rotated token after each call
/// 4. Verify the second exchange presented the first rotated token
#[tokio::test]
async fn test_rotation_written_before_return() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("refresh_token");
    let exchanger = Arc::new(RotatingExchanger { calls: AtomicUsize::new(0) });
    let manager = TokenLifecycleManager::new(
        SharedExchanger(Arc::clone(&exchanger)),
        FileStore { path: path.clone() },
        "refresh-0",
    );
    let cancel = CancellationToken::new();

    let first = manager.get_access_token(&cancel).await.unwrap();
    assert_eq!(first, "access-1-from-refresh-0");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "refresh-1");

    let second = manager.get_access_token(&cancel).await.unwrap();
    assert_eq!(second, "access-2-from-refresh-1");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "refresh-2");
}

/// Validates the persist failure path through a store pointing into a
/// missing directory.
///
/// # Test Steps
/// 1. Point the store at a path whose parent does not exist
/// 2. Verify the call fails with `Persist` and nothing is cached
#[tokio::test]
async fn test_unwritable_store_fails_refresh() {
    let temp = TempDir::new().unwrap();
    let exchanger = Arc::new(RotatingExchanger { calls: AtomicUsize::new(0) });
    let manager = TokenLifecycleManager::new(
        SharedExchanger(Arc::clone(&exchanger)),
        FileStore { path: temp.path().join("missing").join("refresh_token") },
        "refresh-0",
    );

    let err = manager.get_access_token(&CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, TokenError::Persist(_)));
    assert!(manager.cached_credential().await.is_none());
}

#[tokio::test]
async fn test_empty_refresh_token_rejected() {
    let temp = TempDir::new().unwrap();
    let exchanger = Arc::new(RotatingExchanger { calls: AtomicUsize::new(0) });
    let manager = TokenLifecycleManager::new(
        SharedExchanger(Arc::clone(&exchanger)),
        FileStore { path: temp.path().join("refresh_token") },
        "",
    );

    let err = manager.get_access_token(&CancellationToken::new()).await.unwrap_err();
    assert_eq!(err, TokenError::MissingRefreshToken);
    assert_eq!(exchanger.calls.load(Ordering::SeqCst), 0);
}
