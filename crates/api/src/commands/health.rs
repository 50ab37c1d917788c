//! Health check

use crate::context::AppContext;
use crate::utils::health::{ComponentHealth, HealthStatus};

impl AppContext {
    /// Check the local components. No remote calls are made.
    pub async fn health_check(&self) -> HealthStatus {
        let database = match self.db.health_check() {
            Ok(()) => ComponentHealth::healthy("database"),
            Err(e) => ComponentHealth::unhealthy("database", e.to_string()),
        };

        let rate_limiters = if self.rate_limiters.is_empty() {
            ComponentHealth::unhealthy("rate_limiters", "no operation quotas registered")
        } else {
            ComponentHealth::healthy("rate_limiters")
        };

        let credentials = if self.config.auth.refresh_token.trim().is_empty() {
            ComponentHealth::unhealthy("credentials", "no refresh token configured")
        } else {
            ComponentHealth::healthy("credentials")
        };

        let lifecycle = if self.is_shut_down() {
            ComponentHealth::unhealthy("lifecycle", "context has been shut down")
        } else {
            ComponentHealth::healthy("lifecycle")
        };

        let mut status = HealthStatus::new()
            .add_component(database)
            .add_component(rate_limiters)
            .add_component(credentials)
            .add_component(lifecycle);
        status.calculate_score();
        status
    }
}
