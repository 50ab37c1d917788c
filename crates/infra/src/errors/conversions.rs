//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use sellerdesk_common::auth::TokenError;
use sellerdesk_common::resilience::RateLimitError;
use sellerdesk_common::storage::StorageError;
use sellerdesk_domain::SellerDeskError;

use crate::api::ApiError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SellerDeskError);

impl From<InfraError> for SellerDeskError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SellerDeskError> for InfraError {
    fn from(value: SellerDeskError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSellerDeskError {
    fn into_sellerdesk(self) -> SellerDeskError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → SellerDeskError */
/* -------------------------------------------------------------------------- */

impl IntoSellerDeskError for SqlError {
    fn into_sellerdesk(self) -> SellerDeskError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => SellerDeskError::Database("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        SellerDeskError::Database("database is locked".into())
                    }
                    ErrorCode::ConstraintViolation => {
                        SellerDeskError::Database(format!("constraint violation: {message}"))
                    }
                    ErrorCode::NotADatabase => SellerDeskError::Database(
                        "SQLCipher key rejected or database not encrypted".into(),
                    ),
                    _ => SellerDeskError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => SellerDeskError::Database("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                SellerDeskError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                SellerDeskError::Database(format!("invalid column type for {name}: {ty}"))
            }
            RE::InvalidPath(path) => SellerDeskError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => SellerDeskError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        Self(value.into_sellerdesk())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SellerDeskError */
/* -------------------------------------------------------------------------- */

impl IntoSellerDeskError for HttpError {
    fn into_sellerdesk(self) -> SellerDeskError {
        if self.is_timeout() {
            return SellerDeskError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return SellerDeskError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return SellerDeskError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            return SellerDeskError::RemoteApi { status: status.as_u16(), body: String::new() };
        }

        SellerDeskError::Network(format!("HTTP error: {self}"))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_sellerdesk())
    }
}

/* -------------------------------------------------------------------------- */
/* common errors → SellerDeskError */
/* -------------------------------------------------------------------------- */

impl IntoSellerDeskError for StorageError {
    fn into_sellerdesk(self) -> SellerDeskError {
        match self {
            StorageError::Rusqlite(err) => err.into_sellerdesk(),
            StorageError::InvalidConfig(message) => SellerDeskError::Config(message),
            other => SellerDeskError::Database(other.to_string()),
        }
    }
}

impl From<StorageError> for InfraError {
    fn from(value: StorageError) -> Self {
        Self(value.into_sellerdesk())
    }
}

impl IntoSellerDeskError for TokenError {
    fn into_sellerdesk(self) -> SellerDeskError {
        match self {
            TokenError::Cancelled => SellerDeskError::Cancelled("token refresh".into()),
            TokenError::Persist(message) => SellerDeskError::Persistence(message),
            other => SellerDeskError::Auth(other.to_string()),
        }
    }
}

impl From<TokenError> for InfraError {
    fn from(value: TokenError) -> Self {
        Self(value.into_sellerdesk())
    }
}

impl IntoSellerDeskError for RateLimitError {
    fn into_sellerdesk(self) -> SellerDeskError {
        match self {
            RateLimitError::Cancelled(key) => SellerDeskError::RateLimitCancelled(key),
            RateLimitError::UnknownKey(key) => {
                SellerDeskError::InvalidInput(format!("unknown operation key '{key}'"))
            }
            RateLimitError::InvalidConfig(message) => SellerDeskError::Config(message),
        }
    }
}

impl From<RateLimitError> for InfraError {
    fn from(value: RateLimitError) -> Self {
        Self(value.into_sellerdesk())
    }
}

/* -------------------------------------------------------------------------- */
/* ApiError → SellerDeskError */
/* -------------------------------------------------------------------------- */

impl IntoSellerDeskError for ApiError {
    fn into_sellerdesk(self) -> SellerDeskError {
        match self {
            ApiError::Token(err) => err.into_sellerdesk(),
            ApiError::RateLimit(err) => err.into_sellerdesk(),
            ApiError::Remote { status, body } => SellerDeskError::RemoteApi { status, body },
            ApiError::Network(message) => SellerDeskError::Network(message),
            ApiError::Timeout(after) => {
                SellerDeskError::Network(format!("request timed out after {after:?}"))
            }
            ApiError::Decode(message) => SellerDeskError::Internal(message),
            ApiError::Config(message) => SellerDeskError::Config(message),
            ApiError::Cancelled => SellerDeskError::Cancelled("remote call".into()),
        }
    }
}

impl From<ApiError> for InfraError {
    fn from(value: ApiError) -> Self {
        Self(value.into_sellerdesk())
    }
}

impl From<ApiError> for SellerDeskError {
    fn from(value: ApiError) -> Self {
        value.into_sellerdesk()
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
