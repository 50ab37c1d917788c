//! Refresh-token grant against the LWA token endpoint
//!
//! Handles:
//! - form-encoded `grant_type=refresh_token` requests
//! - one attempt per exchange, never retried
//! - mapping endpoint failures into [`TokenError`]

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use sellerdesk_common::auth::{TokenError, TokenExchangeClient, TokenResponse};
use sellerdesk_domain::config::AuthConfig;
use sellerdesk_domain::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use tracing::{debug, instrument, warn};

use crate::http::HttpClient;

/// Client credentials for the token endpoint
#[derive(Clone)]
pub struct LwaConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_endpoint: String,
    pub timeout: Duration,
}

impl LwaConfig {
    pub fn from_auth(auth: &AuthConfig, timeout: Duration) -> Self {
        Self {
            client_id: auth.client_id.clone(),
            client_secret: auth.client_secret.clone(),
            token_endpoint: auth.token_endpoint.clone(),
            timeout,
        }
    }
}

// Custom Debug impl to avoid exposing the client secret
impl fmt::Debug for LwaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LwaConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("token_endpoint", &self.token_endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTP implementation of [`TokenExchangeClient`].
#[derive(Debug, Clone)]
pub struct LwaTokenClient {
    config: LwaConfig,
    http: HttpClient,
}

impl LwaTokenClient {
    /// # Errors
    /// Returns [`TokenError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: LwaConfig) -> Result<Self, TokenError> {
        let timeout = if config.timeout.is_zero() {
            Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)
        } else {
            config.timeout
        };
        let http = HttpClient::builder()
            .timeout(timeout)
            .max_attempts(1)
            .build()
            .map_err(|e| TokenError::Transport(e.to_string()))?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl TokenExchangeClient for LwaTokenClient {
    #[instrument(skip_all, fields(endpoint = %self.config.token_endpoint))]
    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, TokenError> {
        if refresh_token.is_empty() {
            return Err(TokenError::MissingRefreshToken);
        }

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let builder = self.http.request(Method::POST, &self.config.token_endpoint).form(&params);
        let response =
            self.http.send(builder).await.map_err(|e| TokenError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TokenError::Transport(format!("failed to read token response: {e}")))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Token exchange rejected");
            return Err(TokenError::Exchange { status: status.as_u16(), body });
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| TokenError::InvalidResponse(e.to_string()))?;
        if parsed.access_token.is_empty() {
            return Err(TokenError::InvalidResponse("empty access_token".into()));
        }

        debug!(expires_in = parsed.expires_in, rotated = parsed.refresh_token.is_some(), "Token exchange succeeded");
        Ok(parsed)
    }
}
