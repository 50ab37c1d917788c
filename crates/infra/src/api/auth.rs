//! Access token seam for the gateway
//!
//! The gateway asks an [`AccessTokenProvider`] for a bearer token on every
//! call. Production wires in the shared [`TokenLifecycleManager`]; tests use
//! a fixed token.

use async_trait::async_trait;
use sellerdesk_common::auth::{RefreshTokenStore, TokenExchangeClient, TokenLifecycleManager};
use tokio_util::sync::CancellationToken;

use super::errors::ApiError;

/// Trait for providing access tokens
///
/// This trait allows dependency injection and testing with mock providers.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token, refreshing if needed.
    async fn access_token(&self, cancel: &CancellationToken) -> Result<String, ApiError>;
}

#[async_trait]
impl<X, S> AccessTokenProvider for TokenLifecycleManager<X, S>
where
    X: TokenExchangeClient + 'static,
    S: RefreshTokenStore + 'static,
{
    async fn access_token(&self, cancel: &CancellationToken) -> Result<String, ApiError> {
        Ok(self.get_access_token(cancel).await?)
    }
}

/// Provider that always returns the same token.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self, cancel: &CancellationToken) -> Result<String, ApiError> {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        Ok(self.token.clone())
    }
}
