//! Rate limiter registry seeded with the published operation quotas

use sellerdesk_common::resilience::{RateLimitError, RateLimiterRegistry};
use sellerdesk_domain::constants::OPERATION_QUOTAS;

/// One bucket per remote operation, shared by every gateway call.
///
/// # Errors
/// Only if the quota table itself is invalid.
pub fn operation_rate_limiters() -> Result<RateLimiterRegistry, RateLimitError> {
    RateLimiterRegistry::from_quotas(OPERATION_QUOTAS)
}
