//! Inbound plan creation and operation status

use std::sync::Arc;

use async_trait::async_trait;
use sellerdesk_core::PlanSubmitter;
use sellerdesk_domain::constants::operations::{
    FBA_CREATE_INBOUND_PLAN, FBA_GET_INBOUND_OPERATION_STATUS,
};
use sellerdesk_domain::{
    CreatedPlan, InboundOperationStatus, MarketplaceConfig, OperationProblem, PlanItem, Result,
    SellerDeskError, ShipFromAddress,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::types::{
    unwrap_payload, AddressInput, CreateInboundPlanRequest, CreateInboundPlanResponse, ItemInput,
    OperationStatusResponse,
};
use super::{INBOUND_OPERATIONS_PATH, INBOUND_PLANS_PATH};
use crate::api::{ApiGatewayClient, ApiRequest};

/// Client for the 2024-03-20 inbound API.
pub struct SpApiInboundClient {
    gateway: Arc<ApiGatewayClient>,
    destination_marketplaces: Vec<String>,
    ship_from: Option<ShipFromAddress>,
}

impl SpApiInboundClient {
    pub fn new(
        gateway: Arc<ApiGatewayClient>,
        marketplace: &MarketplaceConfig,
        ship_from: Option<ShipFromAddress>,
    ) -> Self {
        Self { gateway, destination_marketplaces: marketplace.marketplace_ids.clone(), ship_from }
    }

    /// Look up an asynchronous inbound operation.
    ///
    /// # Errors
    /// `InvalidInput` for a blank id; otherwise gateway and decode failures.
    #[instrument(skip(self, cancel))]
    pub async fn get_operation_status(
        &self,
        operation_id: &str,
        cancel: &CancellationToken,
    ) -> Result<InboundOperationStatus> {
        let operation_id = operation_id.trim();
        if operation_id.is_empty() {
            return Err(SellerDeskError::InvalidInput("operation id is empty".into()));
        }

        let path = format!("{INBOUND_OPERATIONS_PATH}/{}", urlencoding::encode(operation_id));
        let value = self
            .gateway
            .call_checked(FBA_GET_INBOUND_OPERATION_STATUS, &ApiRequest::get(path), cancel)
            .await?;

        let response: OperationStatusResponse = decode(value, "operation status")?;
        Ok(InboundOperationStatus {
            operation_id: response.operation_id,
            operation: response.operation,
            operation_status: response.operation_status,
            operation_problems: response
                .operation_problems
                .into_iter()
                .map(|p| OperationProblem { code: p.code, message: p.message, severity: p.severity })
                .collect(),
        })
    }

    fn plan_body(&self, items: &[PlanItem]) -> Result<CreateInboundPlanRequest> {
        let address = self.ship_from.as_ref().ok_or_else(|| {
            SellerDeskError::Config("ship_from address is required to create inbound plans".into())
        })?;

        Ok(CreateInboundPlanRequest {
            destination_marketplaces: self.destination_marketplaces.clone(),
            source_address: address_input(address),
            items: items
                .iter()
                .map(|item| ItemInput {
                    msku: item.sku.clone(),
                    quantity: item.quantity,
                    prep_owner: item.prep_owner,
                    label_owner: item.label_owner,
                })
                .collect(),
        })
    }
}

#[async_trait]
impl PlanSubmitter for SpApiInboundClient {
    async fn submit_plan(
        &self,
        items: &[PlanItem],
        cancel: &CancellationToken,
    ) -> Result<CreatedPlan> {
        let body = serde_json::to_value(self.plan_body(items)?)
            .map_err(|e| SellerDeskError::Internal(format!("serialize inbound plan: {e}")))?;

        let value = self
            .gateway
            .call_checked(FBA_CREATE_INBOUND_PLAN, &ApiRequest::post(INBOUND_PLANS_PATH, body), cancel)
            .await?;

        let response: CreateInboundPlanResponse = decode(value, "inbound plan")?;
        info!(
            inbound_plan_id = %response.inbound_plan_id,
            operation_id = %response.operation_id,
            "Inbound plan accepted"
        );
        Ok(CreatedPlan {
            inbound_plan_id: response.inbound_plan_id,
            operation_id: response.operation_id,
        })
    }
}

fn address_input(address: &ShipFromAddress) -> AddressInput {
    AddressInput {
        name: address.name.clone(),
        company_name: address.company_name.clone(),
        address_line1: address.address_line1.clone(),
        address_line2: address.address_line2.clone(),
        city: address.city.clone(),
        state_or_province_code: address.state_or_province_code.clone(),
        postal_code: address.postal_code.clone(),
        country_code: address.country_code.clone(),
        email: address.email.clone(),
        phone_number: address.phone_number.clone(),
    }
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(unwrap_payload(value))
        .map_err(|e| SellerDeskError::Internal(format!("unexpected {what} body: {e}")))
}
