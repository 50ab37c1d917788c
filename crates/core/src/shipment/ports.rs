//! Port interfaces for inbound plan creation
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use sellerdesk_domain::{CreatedPlan, PlanItem, PrepRequirements, Result};
use tokio_util::sync::CancellationToken;

/// Trait for submitting an inbound plan to the remote service
#[async_trait]
pub trait PlanSubmitter: Send + Sync {
    /// Submit one plan. A rejection must surface as
    /// `SellerDeskError::RemoteApi` with the raw response body.
    async fn submit_plan(
        &self,
        items: &[PlanItem],
        cancel: &CancellationToken,
    ) -> Result<CreatedPlan>;
}

/// Trait for the durable SKU requirement store
///
/// Synchronous on purpose: every mutation is written back completely before
/// the engine continues.
pub trait PrepRequirementRepository: Send + Sync {
    /// Load all requirements; a missing store yields an empty map.
    fn load(&self) -> Result<PrepRequirements>;

    /// Replace the stored requirements with `requirements`.
    fn save(&self, requirements: &PrepRequirements) -> Result<()>;
}
