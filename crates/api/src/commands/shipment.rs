//! Inbound shipment commands

use sellerdesk_domain::{InboundOperationStatus, PlanItemInput, PlanResult, PrepRequirements, Result};
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_with_logging;

impl AppContext {
    /// Create an inbound plan, correcting ownership once on rejection.
    ///
    /// # Errors
    /// See [`PlanRetryEngine::create_plan`](sellerdesk_core::PlanRetryEngine::create_plan).
    pub async fn submit_plan_with_retry(&self, items: &[PlanItemInput]) -> Result<PlanResult> {
        self.submit_plan(items, &self.cancel_token()).await
    }

    /// [`submit_plan_with_retry`](Self::submit_plan_with_retry) that also
    /// stops when `cancel` fires.
    ///
    /// # Errors
    /// As `submit_plan_with_retry`.
    pub async fn submit_plan_with_retry_cancellable(
        &self,
        items: &[PlanItemInput],
        cancel: &CancellationToken,
    ) -> Result<PlanResult> {
        let (token, _guard) = self.linked_cancel_token(cancel);
        self.submit_plan(items, &token).await
    }

    async fn submit_plan(&self, items: &[PlanItemInput], cancel: &CancellationToken) -> Result<PlanResult> {
        execute_with_logging("shipment::submit_plan_with_retry", || async {
            self.plan_engine.create_plan(items, cancel).await
        })
        .await
    }

    /// Poll an asynchronous inbound operation.
    ///
    /// # Errors
    /// `InvalidInput` for a blank id, otherwise gateway errors.
    pub async fn get_operation_status(&self, operation_id: &str) -> Result<InboundOperationStatus> {
        execute_with_logging("shipment::get_operation_status", || async {
            self.inbound.get_operation_status(operation_id, &self.cancel_token()).await
        })
        .await
    }

    /// Ownership requirements learned so far.
    pub async fn prep_requirements(&self) -> PrepRequirements {
        self.plan_engine.requirements().await
    }
}
