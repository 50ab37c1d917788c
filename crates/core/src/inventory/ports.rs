//! Port interfaces for the inventory cache
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use sellerdesk_domain::{InventoryPage, InventoryQuery, InventoryRecord, Result};
use tokio_util::sync::CancellationToken;

/// Trait for paging through the remote inventory listing
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Fetch one page. `next_token` is `None` for the first page.
    ///
    /// An unparseable optional timestamp on the page must be reported as
    /// `SellerDeskError::TransientPaginationParse`.
    async fn fetch_page(
        &self,
        next_token: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<InventoryPage>;
}

/// Trait for the local base table and its search projection
#[async_trait]
pub trait InventoryCache: Send + Sync {
    /// Rows in the base table.
    async fn record_count(&self) -> Result<usize>;

    /// Replace the base table with `records` and rebuild the projection from
    /// them, all in one transaction. Returns rows indexed.
    async fn replace_records(&self, records: Vec<InventoryRecord>) -> Result<usize>;

    /// Rebuild the projection from the base table in one transaction.
    /// Returns rows indexed.
    async fn rebuild_search_index(&self) -> Result<usize>;

    /// Single filtered, sorted read against the projection.
    async fn search(&self, query: &InventoryQuery) -> Result<Vec<InventoryRecord>>;
}
