//! OAuth 2.0 token types
//!
//! Wire format of the refresh-token exchange and the cached credential the
//! token manager hands out.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bearer credential owned by the token manager.
///
/// `expires_at` already has the safety margin subtracted, so a token is
/// usable exactly while `now < expires_at`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub refresh_token: String,
}

impl Credential {
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Seconds until the (margin-adjusted) expiry, negative once expired.
    #[must_use]
    pub fn seconds_until_expiry(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds()
    }
}

// Custom Debug impl to avoid exposing the tokens
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"***")
            .field("expires_at", &self.expires_at)
            .field("refresh_token", &"***")
            .finish()
    }
}

/// Token endpoint response for `grant_type=refresh_token`.
#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub expires_in: i64,
    /// Present when the server rotates the refresh token.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("rotated", &self.refresh_token.is_some())
            .finish_non_exhaustive()
    }
}
