//! Command execution helpers
//!
//! Every operation exposed by [`AppContext`](crate::AppContext) runs through
//! [`execute_with_logging`] so timing and outcome are logged the same way.

use std::future::Future;
use std::time::Instant;

use sellerdesk_domain::Result as DomainResult;

use crate::utils::logging::log_command_execution;

/// Run `command_fn`, logging its duration and outcome under `command_name`.
///
/// # Example
///
/// ```rust,ignore
/// pub async fn rebuild_inventory_cache(&self, force: bool) -> Result<BuildReport> {
///     execute_with_logging("inventory::rebuild", || async {
///         self.inventory_index.build(force, &self.cancel_token()).await
///     })
///     .await
/// }
/// ```
pub async fn execute_with_logging<F, Fut, T>(command_name: &str, command_fn: F) -> DomainResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = command_fn().await;
    log_command_execution(command_name, start.elapsed(), result.as_ref().err());
    result
}
