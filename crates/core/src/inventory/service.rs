//! Inventory cache build and query service

use std::sync::Arc;

use sellerdesk_domain::{
    BuildReport, InventoryQuery, InventoryRecord, Result, SellerDeskError,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::ports::{InventoryCache, InventorySource};

/// Mirrors the remote inventory listing into the local cache
pub struct InventoryCacheIndex {
    source: Arc<dyn InventorySource>,
    cache: Arc<dyn InventoryCache>,
}

struct FetchOutcome {
    records: Vec<InventoryRecord>,
    pages: usize,
    truncated: bool,
}

impl InventoryCacheIndex {
    pub fn new(source: Arc<dyn InventorySource>, cache: Arc<dyn InventoryCache>) -> Self {
        Self { source, cache }
    }

    /// Build the cache.
    ///
    /// With rows already cached and `force_rebuild == false` no remote call
    /// is made and the projection is rebuilt from the base table. Otherwise
    /// every page is fetched and the base table and projection are replaced
    /// together.
    ///
    /// # Errors
    /// Any page error other than `TransientPaginationParse`, and any cache
    /// error. A failed build leaves the previous cache intact.
    pub async fn build(&self, force_rebuild: bool, cancel: &CancellationToken) -> Result<BuildReport> {
        let existing = self.cache.record_count().await?;
        if existing > 0 && !force_rebuild {
            let rows_indexed = self.cache.rebuild_search_index().await?;
            info!(rows = existing, rows_indexed, "Inventory cache reused");
            return Ok(BuildReport { reused: true, rows_indexed, ..BuildReport::default() });
        }

        let fetched = self.fetch_all(cancel).await?;
        let records_fetched = fetched.records.len();

        if records_fetched == 0 && fetched.truncated && existing > 0 {
            warn!("Inventory fetch truncated before any records, keeping existing cache");
            let rows_indexed = self.cache.rebuild_search_index().await?;
            return Ok(BuildReport {
                reused: true,
                pages_fetched: fetched.pages,
                truncated: true,
                rows_indexed,
                ..BuildReport::default()
            });
        }

        let rows_indexed = self.cache.replace_records(fetched.records).await?;
        info!(
            pages = fetched.pages,
            records = records_fetched,
            truncated = fetched.truncated,
            "Inventory cache rebuilt"
        );

        Ok(BuildReport {
            reused: false,
            pages_fetched: fetched.pages,
            records_fetched,
            truncated: fetched.truncated,
            rows_indexed,
        })
    }

    /// Filtered, sorted read of the cached inventory.
    ///
    /// # Errors
    /// Propagates cache errors.
    pub async fn query(&self, query: &InventoryQuery) -> Result<Vec<InventoryRecord>> {
        let rows = self.cache.search(query).await?;
        debug!(keyword = ?query.keyword, sort = %query.sort, rows = rows.len(), "Inventory query");
        Ok(rows)
    }

    async fn fetch_all(&self, cancel: &CancellationToken) -> Result<FetchOutcome> {
        let mut outcome = FetchOutcome { records: Vec::new(), pages: 0, truncated: false };
        let mut next_token: Option<String> = None;

        loop {
            if cancel.is_cancelled() {
                return Err(SellerDeskError::Cancelled("inventory fetch".to_string()));
            }

            let page = match self.source.fetch_page(next_token.as_deref(), cancel).await {
                Ok(page) => page,
                Err(SellerDeskError::TransientPaginationParse(reason)) => {
                    warn!(
                        pages = outcome.pages,
                        records = outcome.records.len(),
                        reason = %reason,
                        "Stopping inventory paging on unparseable page, keeping partial data"
                    );
                    outcome.truncated = true;
                    break;
                }
                Err(e) => return Err(e),
            };

            outcome.pages += 1;
            next_token = page.continuation().map(str::to_string);
            debug!(page = outcome.pages, items = page.records.len(), "Fetched inventory page");
            outcome.records.extend(page.records);

            if next_token.is_none() {
                break;
            }
        }

        Ok(outcome)
    }
}
