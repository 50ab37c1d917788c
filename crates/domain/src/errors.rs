//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for SellerDesk
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SellerDeskError {
    /// The refresh-token exchange failed. Fatal until the credentials are fixed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The caller cancelled while waiting for a rate-limiter token.
    #[error("Rate limit wait cancelled: {0}")]
    RateLimitCancelled(String),

    /// The remote service answered with a non-2xx status.
    #[error("Remote API error: << {status} {body}")]
    RemoteApi { status: u16, body: String },

    /// An inventory page carried an unparseable optional timestamp.
    #[error("Transient pagination parse error: {0}")]
    TransientPaginationParse(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SellerDeskError {
    /// Stable label suitable for structured logging.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Auth(_) => "auth",
            Self::RateLimitCancelled(_) => "rate_limit_cancelled",
            Self::RemoteApi { .. } => "remote_api",
            Self::TransientPaginationParse(_) => "transient_pagination_parse",
            Self::Persistence(_) => "persistence",
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Cancelled(_) => "cancelled",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for SellerDesk operations
pub type Result<T> = std::result::Result<T, SellerDeskError>;
