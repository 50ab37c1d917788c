//! Health check types for AppContext components

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Share of healthy components required for the whole context to be healthy.
pub const HEALTHY_THRESHOLD: f64 = 0.8;

/// Overall health status of the application
///
/// # Example
/// ```
/// use sellerdesk_api::utils::health::{ComponentHealth, HealthStatus};
///
/// let mut status = HealthStatus::new()
///     .add_component(ComponentHealth::healthy("database"))
///     .add_component(ComponentHealth::unhealthy("credentials", "no refresh token"));
/// status.calculate_score();
///
/// assert_eq!(status.score, 0.5);
/// assert!(!status.is_healthy);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub is_healthy: bool,
    /// healthy_components / total_components
    pub score: f64,
    pub message: Option<String>,
    pub components: Vec<ComponentHealth>,
    /// Unix timestamp of the check
    pub timestamp: i64,
}

impl HealthStatus {
    pub fn new() -> Self {
        Self {
            is_healthy: true,
            score: 1.0,
            message: None,
            components: Vec::new(),
            timestamp: Utc::now().timestamp(),
        }
    }

    #[must_use]
    pub fn add_component(mut self, component: ComponentHealth) -> Self {
        self.components.push(component);
        self
    }

    /// Recompute `score`, `is_healthy` and `message` from the components.
    pub fn calculate_score(&mut self) {
        if self.components.is_empty() {
            return;
        }

        let healthy = self.components.iter().filter(|c| c.is_healthy).count();
        self.score = healthy as f64 / self.components.len() as f64;
        self.is_healthy = self.score >= HEALTHY_THRESHOLD;

        let failing: Vec<&str> =
            self.components.iter().filter(|c| !c.is_healthy).map(|c| c.name.as_str()).collect();
        self.message =
            (!failing.is_empty()).then(|| format!("unhealthy components: {}", failing.join(", ")));
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// Health of a single component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub is_healthy: bool,
    pub message: Option<String>,
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: true, message: None }
    }

    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: false, message: Some(message.into()) }
    }
}
