//! Inbound plan creation with a single corrective retry
//!
//! The remote service rejects a plan when an item needs prep or labelling by
//! the seller but was submitted with `NONE`. The engine learns those
//! requirements from the rejection text, writes them to the requirement
//! store, and resubmits once with the corrected ownership.

use std::sync::Arc;

use sellerdesk_domain::{
    ItemRequirement, OwnershipViolation, PlanItem, PlanItemInput, PlanResult, PrepRequirements,
    Result, SellerDeskError,
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::ports::{PlanSubmitter, PrepRequirementRepository};
use super::violations::extract_ownership_violations;

/// Inbound plan service
pub struct PlanRetryEngine {
    submitter: Arc<dyn PlanSubmitter>,
    repository: Arc<dyn PrepRequirementRepository>,
    requirements: Mutex<PrepRequirements>,
}

impl PlanRetryEngine {
    /// Create the engine, loading the requirement store once.
    ///
    /// # Errors
    /// Propagates the repository's load failure.
    pub fn new(
        submitter: Arc<dyn PlanSubmitter>,
        repository: Arc<dyn PrepRequirementRepository>,
    ) -> Result<Self> {
        let requirements = repository.load()?;
        debug!(skus = requirements.len(), "Loaded prep requirements");
        Ok(Self { submitter, repository, requirements: Mutex::new(requirements) })
    }

    /// Submit a plan for `inputs`, retrying once if the rejection names
    /// ownership requirements.
    ///
    /// Learned requirements are persisted before the retry, so the store
    /// reflects them whether or not the retry succeeds. When the retry also
    /// fails, the first rejection is returned.
    ///
    /// # Errors
    /// - `InvalidInput` for an empty plan or a zero quantity
    /// - the first submission's error when it carries no ownership pattern
    /// - `Persistence` when learned requirements cannot be written
    pub async fn create_plan(
        &self,
        inputs: &[PlanItemInput],
        cancel: &CancellationToken,
    ) -> Result<PlanResult> {
        validate_inputs(inputs)?;

        let mut items = self.annotate(inputs).await;
        let original = match self.submitter.submit_plan(&items, cancel).await {
            Ok(created) => {
                info!(plan_id = %created.inbound_plan_id, "Inbound plan accepted");
                return Ok(PlanResult::accepted(created, 1, Vec::new()));
            }
            Err(err) => err,
        };

        let violations = match &original {
            SellerDeskError::RemoteApi { body, .. } => extract_ownership_violations(body),
            _ => Vec::new(),
        };
        if violations.is_empty() {
            return Err(original);
        }

        info!(violations = violations.len(), "Plan rejected for missing ownership, retrying once");
        self.learn(&violations).await?;
        apply_violations(&mut items, &violations);

        match self.submitter.submit_plan(&items, cancel).await {
            Ok(created) => {
                info!(plan_id = %created.inbound_plan_id, "Inbound plan accepted after correction");
                Ok(PlanResult::accepted(created, 2, violations))
            }
            Err(retry_err) => {
                warn!(error = %retry_err, "Corrected plan rejected, returning first error");
                Err(original)
            }
        }
    }

    /// Snapshot of the in-memory requirement store.
    pub async fn requirements(&self) -> PrepRequirements {
        self.requirements.lock().await.clone()
    }

    async fn annotate(&self, inputs: &[PlanItemInput]) -> Vec<PlanItem> {
        let requirements = self.requirements.lock().await;
        inputs
            .iter()
            .map(|input| {
                let requirement = requirements.get(&input.sku).copied().unwrap_or_default();
                PlanItem::annotate(input, requirement)
            })
            .collect()
    }

    async fn learn(&self, violations: &[OwnershipViolation]) -> Result<()> {
        let mut requirements = self.requirements.lock().await;
        let mut changed = false;
        for violation in violations {
            let entry: &mut ItemRequirement =
                requirements.entry(violation.sku.clone()).or_default();
            changed |= entry.require_seller(violation.dimension);
        }
        if changed {
            self.repository.save(&requirements)?;
            debug!(skus = requirements.len(), "Prep requirements persisted");
        }
        Ok(())
    }
}

fn validate_inputs(inputs: &[PlanItemInput]) -> Result<()> {
    if inputs.is_empty() {
        return Err(SellerDeskError::InvalidInput("plan has no items".to_string()));
    }
    if let Some(input) = inputs.iter().find(|i| i.quantity == 0) {
        return Err(SellerDeskError::InvalidInput(format!("quantity for {} must be positive", input.sku)));
    }
    Ok(())
}

fn apply_violations(items: &mut [PlanItem], violations: &[OwnershipViolation]) {
    for item in items.iter_mut() {
        let mut requirement =
            ItemRequirement { prep_owner: item.prep_owner, label_owner: item.label_owner };
        for violation in violations.iter().filter(|v| v.sku == item.sku) {
            requirement.require_seller(violation.dimension);
        }
        item.prep_owner = requirement.prep_owner;
        item.label_owner = requirement.label_owner;
    }
}
