//! Access token commands

use chrono::{DateTime, Utc};
use sellerdesk_domain::{Result, SellerDeskError};
use sellerdesk_infra::InfraError;
use serde::Serialize;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_with_logging;

/// Validity of the cached access token. The token itself is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenStatus {
    pub expires_at: DateTime<Utc>,
    pub expires_in_secs: i64,
}

impl AppContext {
    /// Make sure a valid access token is cached, refreshing if needed.
    ///
    /// # Errors
    /// `Auth` when the exchange is rejected, `Persistence` when a rotated
    /// refresh token cannot be written, `Cancelled` after shutdown.
    pub async fn ensure_token(&self) -> Result<TokenStatus> {
        execute_with_logging("auth::ensure_token", || async {
            let credential = self
                .token_manager
                .get_credential(&self.cancel_token())
                .await
                .map_err(|e| SellerDeskError::from(InfraError::from(e)))?;

            Ok(TokenStatus {
                expires_at: credential.expires_at,
                expires_in_secs: credential.seconds_until_expiry(),
            })
        })
        .await
    }

    /// Drop the cached access token so the next call refreshes.
    pub async fn invalidate_token(&self) {
        self.token_manager.invalidate().await;
    }
}
