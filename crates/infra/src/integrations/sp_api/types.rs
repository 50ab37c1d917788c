//! Wire format of the Selling Partner API endpoints used here
use sellerdesk_domain::Owner;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /fba/inventory/v1/summaries`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct InventorySummariesResponse {
    #[serde(default)]
    pub payload: Option<InventorySummariesPayload>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InventorySummariesPayload {
    #[serde(default)]
    pub inventory_summaries: Vec<InventorySummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Pagination {
    #[serde(default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InventorySummary {
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub seller_sku: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub total_quantity: Option<i64>,
    /// Kept as a raw string; parsed separately so a bad value can be
    /// reported as a transient page error instead of a decode failure.
    #[serde(default)]
    pub last_updated_time: Option<String>,
    #[serde(default)]
    pub inventory_details: Option<InventoryDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InventoryDetails {
    #[serde(default)]
    pub fulfillable_quantity: Option<i64>,
    #[serde(default)]
    pub inbound_receiving_quantity: Option<i64>,
    #[serde(default)]
    pub inbound_shipped_quantity: Option<i64>,
}

/// `POST /inbound/fba/2024-03-20/inboundPlans`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateInboundPlanRequest {
    pub destination_marketplaces: Vec<String>,
    pub source_address: AddressInput,
    pub items: Vec<ItemInput>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddressInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub address_line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_or_province_code: Option<String>,
    pub postal_code: String,
    pub country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ItemInput {
    pub msku: String,
    pub quantity: u32,
    pub prep_owner: Owner,
    pub label_owner: Owner,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateInboundPlanResponse {
    pub inbound_plan_id: String,
    pub operation_id: String,
}

/// `GET /inbound/fba/2024-03-20/operations/{operationId}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OperationStatusResponse {
    pub operation_id: String,
    #[serde(default)]
    pub operation: String,
    pub operation_status: String,
    #[serde(default)]
    pub operation_problems: Vec<OperationProblemWire>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OperationProblemWire {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub severity: String,
}

/// Some endpoints wrap the body in `payload`; accept either form.
pub(crate) fn unwrap_payload(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("payload") => {
            map.remove("payload").unwrap_or(Value::Null)
        }
        other => other,
    }
}
