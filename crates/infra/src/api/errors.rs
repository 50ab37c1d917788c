//! API-specific error types
//!
//! Provides error classification for gateway calls with retry metadata.

use std::time::Duration;

use sellerdesk_common::auth::TokenError;
use sellerdesk_common::resilience::RateLimitError;
use thiserror::Error;

/// Categories of API errors for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Token acquisition failed - fatal until credentials are fixed
    Authentication,
    /// Caller gave up while waiting for a token or a response
    Cancelled,
    /// Remote answered 429
    RateLimit,
    /// Remote answered 5xx
    Server,
    /// Remote answered 4xx other than 429
    Client,
    /// Network/connection errors
    Network,
    /// Configuration or decoding errors - non-retryable
    Config,
}

/// Gateway operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    RateLimit(#[from] RateLimitError),

    /// Non-2xx response, rendered the way operators read it in logs.
    #[error("<< {status} {body}")]
    Remote { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Token(TokenError::Cancelled)
            | Self::RateLimit(RateLimitError::Cancelled(_))
            | Self::Cancelled => ApiErrorCategory::Cancelled,
            Self::Token(_) => ApiErrorCategory::Authentication,
            Self::RateLimit(_) | Self::Decode(_) | Self::Config(_) => ApiErrorCategory::Config,
            Self::Remote { status: 429, .. } => ApiErrorCategory::RateLimit,
            Self::Remote { status, .. } if *status >= 500 => ApiErrorCategory::Server,
            Self::Remote { .. } => ApiErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
        }
    }

    /// Whether a later attempt could succeed unchanged.
    ///
    /// The gateway itself never retries; this is informational for callers
    /// and logs.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ApiErrorCategory::RateLimit | ApiErrorCategory::Server | ApiErrorCategory::Network
        )
    }
}
