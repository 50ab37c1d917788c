//! Raw rate-limited remote calls

use sellerdesk_domain::Result;
use sellerdesk_infra::{ApiRequest, RemoteCallOutcome};
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_with_logging;

impl AppContext {
    /// Issue `request` under `operation_key`'s quota.
    ///
    /// A non-2xx response is returned as [`RemoteCallOutcome::Failure`].
    ///
    /// # Errors
    /// `InvalidInput` for an unregistered operation key, `Auth` when no token
    /// can be obtained, `RateLimitCancelled` or `Cancelled` after shutdown,
    /// `Network` on transport failure.
    pub async fn call_rate_limited(
        &self,
        operation_key: &str,
        request: ApiRequest,
    ) -> Result<RemoteCallOutcome> {
        self.gateway_call(operation_key, request, &self.cancel_token()).await
    }

    /// [`call_rate_limited`](Self::call_rate_limited) that also stops when
    /// `cancel` fires.
    ///
    /// # Errors
    /// As `call_rate_limited`.
    pub async fn call_rate_limited_cancellable(
        &self,
        operation_key: &str,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<RemoteCallOutcome> {
        let (token, _guard) = self.linked_cancel_token(cancel);
        self.gateway_call(operation_key, request, &token).await
    }

    async fn gateway_call(
        &self,
        operation_key: &str,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<RemoteCallOutcome> {
        execute_with_logging("gateway::call_rate_limited", || async {
            Ok(self.gateway.call(operation_key, &request, cancel).await?)
        })
        .await
    }
}
