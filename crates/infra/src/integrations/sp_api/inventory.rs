//! FBA inventory summaries as an `InventorySource`

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use sellerdesk_core::InventorySource;
use sellerdesk_domain::constants::operations::FBA_INVENTORY_SUMMARIES;
use sellerdesk_domain::{
    InventoryPage, InventoryRecord, MarketplaceConfig, Result, SellerDeskError,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::types::{InventorySummariesResponse, InventorySummary};
use super::INVENTORY_SUMMARIES_PATH;
use crate::api::{ApiGatewayClient, ApiRequest};

/// Pages through `/fba/inventory/v1/summaries` for one marketplace.
pub struct SpApiInventorySource {
    gateway: Arc<ApiGatewayClient>,
    marketplace_ids: Vec<String>,
    granularity_id: String,
}

impl SpApiInventorySource {
    pub fn new(gateway: Arc<ApiGatewayClient>, marketplace: &MarketplaceConfig) -> Self {
        Self {
            gateway,
            marketplace_ids: marketplace.marketplace_ids.clone(),
            granularity_id: marketplace.primary().to_string(),
        }
    }

    fn page_request(&self, next_token: Option<&str>) -> ApiRequest {
        let mut request = ApiRequest::get(INVENTORY_SUMMARIES_PATH)
            .query("marketplaceIds", self.marketplace_ids.join(","))
            .query("granularityType", "Marketplace")
            .query("granularityId", self.granularity_id.as_str())
            .query("details", "true");
        if let Some(token) = next_token {
            request = request.query("nextToken", token);
        }
        request
    }
}

#[async_trait]
impl InventorySource for SpApiInventorySource {
    async fn fetch_page(
        &self,
        next_token: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<InventoryPage> {
        let request = self.page_request(next_token);
        let value = self.gateway.call_checked(FBA_INVENTORY_SUMMARIES, &request, cancel).await?;

        let response: InventorySummariesResponse = serde_json::from_value(value).map_err(|e| {
            SellerDeskError::Internal(format!("unexpected inventory summaries body: {e}"))
        })?;
        let page = into_page(response)?;
        debug!(records = page.records.len(), has_more = page.continuation().is_some(), "Fetched inventory page");
        Ok(page)
    }
}

fn into_page(response: InventorySummariesResponse) -> Result<InventoryPage> {
    let summaries = response.payload.map(|p| p.inventory_summaries).unwrap_or_default();
    let mut records = Vec::with_capacity(summaries.len());
    for summary in summaries {
        check_timestamp(&summary)?;
        records.push(into_record(summary));
    }

    let next_token = response.pagination.and_then(|p| p.next_token);
    Ok(InventoryPage { records, next_token })
}

/// A present, non-empty `lastUpdatedTime` that is not RFC 3339 marks the page
/// as transiently unreadable.
fn check_timestamp(summary: &InventorySummary) -> Result<()> {
    let Some(raw) = summary.last_updated_time.as_deref().map(str::trim) else {
        return Ok(());
    };
    if raw.is_empty() {
        return Ok(());
    }
    DateTime::parse_from_rfc3339(raw).map(|_| ()).map_err(|e| {
        warn!(sku = ?summary.seller_sku, value = raw, "Unparseable lastUpdatedTime");
        SellerDeskError::TransientPaginationParse(format!("lastUpdatedTime '{raw}': {e}"))
    })
}

fn into_record(summary: InventorySummary) -> InventoryRecord {
    let details = summary.inventory_details.unwrap_or_default();
    InventoryRecord {
        title: summary.product_name.unwrap_or_default(),
        total_quantity: summary.total_quantity.unwrap_or(0),
        fulfillable_quantity: details.fulfillable_quantity.unwrap_or(0),
        inbound_receiving_quantity: details.inbound_receiving_quantity.unwrap_or(0),
        inbound_shipped_quantity: details.inbound_shipped_quantity.unwrap_or(0),
        sku: summary.seller_sku.unwrap_or_default(),
        asin: summary.asin.unwrap_or_default(),
        // not part of the summaries listing
        upc: None,
    }
}
