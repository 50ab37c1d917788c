//! Ports used by the token manager
//!
//! These traits keep the HTTP exchange and the durable configuration out of
//! the token manager so it can be tested with in-memory fakes.

use async_trait::async_trait;

use super::token_manager::TokenError;
use super::types::TokenResponse;

/// Performs the OAuth2 refresh-token grant.
#[async_trait]
pub trait TokenExchangeClient: Send + Sync {
    /// Exchange `refresh_token` for a fresh access token.
    ///
    /// # Errors
    /// Returns [`TokenError::Exchange`] on a non-2xx response and
    /// [`TokenError::Transport`] when the endpoint cannot be reached.
    async fn exchange_refresh_token(&self, refresh_token: &str)
        -> Result<TokenResponse, TokenError>;
}

/// Durable home of the refresh token.
///
/// Called while the token manager still holds its lock, before the new
/// access token reaches any caller. Implementations must write through to
/// disk before returning.
pub trait RefreshTokenStore: Send + Sync {
    /// # Errors
    /// Returns [`TokenError::Persist`] when the write fails.
    fn persist_refresh_token(&self, refresh_token: &str) -> Result<(), TokenError>;
}

impl<T: RefreshTokenStore + ?Sized> RefreshTokenStore for std::sync::Arc<T> {
    fn persist_refresh_token(&self, refresh_token: &str) -> Result<(), TokenError> {
        (**self).persist_refresh_token(refresh_token)
    }
}
