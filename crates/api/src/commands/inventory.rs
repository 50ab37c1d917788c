//! Inventory cache commands

use sellerdesk_domain::{BuildReport, InventoryQuery, InventoryRecord, Result, SortKey};
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_with_logging;

impl AppContext {
    /// Refresh the local inventory cache.
    ///
    /// Without `force`, an already populated base table is reused and only
    /// the search projection is rebuilt.
    ///
    /// # Errors
    /// Remote errors other than an unparseable page, and database errors.
    pub async fn rebuild_inventory_cache(&self, force: bool) -> Result<BuildReport> {
        self.rebuild(force, &self.cancel_token()).await
    }

    /// [`rebuild_inventory_cache`](Self::rebuild_inventory_cache) that also
    /// stops when `cancel` fires. Paging stops at the next page boundary.
    ///
    /// # Errors
    /// As `rebuild_inventory_cache`, or `Cancelled`.
    pub async fn rebuild_inventory_cache_cancellable(
        &self,
        force: bool,
        cancel: &CancellationToken,
    ) -> Result<BuildReport> {
        let (token, _guard) = self.linked_cancel_token(cancel);
        self.rebuild(force, &token).await
    }

    async fn rebuild(&self, force: bool, cancel: &CancellationToken) -> Result<BuildReport> {
        execute_with_logging("inventory::rebuild_inventory_cache", || async {
            self.inventory_index.build(force, cancel).await
        })
        .await
    }

    /// Search the cache.
    ///
    /// A blank `keyword` disables the text filter and a blank `sort_key`
    /// sorts by title ascending.
    ///
    /// # Errors
    /// `InvalidInput` for an unknown sort key or `min_qty > max_qty`.
    pub async fn query_inventory(
        &self,
        keyword: &str,
        min_qty: Option<i64>,
        max_qty: Option<i64>,
        sort_key: &str,
    ) -> Result<Vec<InventoryRecord>> {
        execute_with_logging("inventory::query_inventory", || async {
            let sort =
                if sort_key.trim().is_empty() { SortKey::default() } else { sort_key.parse::<SortKey>()? };
            let query = InventoryQuery::new(keyword, min_qty, max_qty, sort)?;
            self.inventory_index.query(&query).await
        })
        .await
    }
}
