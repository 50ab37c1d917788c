//! Selling Partner API adapters
//!
//! Each adapter wraps the shared [`ApiGatewayClient`](crate::api::ApiGatewayClient)
//! and implements one core port:
//!
//! - [`SpApiInventorySource`]: `InventorySource` over FBA inventory summaries
//! - [`SpApiInboundClient`]: `PlanSubmitter` over inbound plan creation, plus
//!   operation status lookups
//!
//! Wire types live in [`types`] and never leave this module.

pub mod inbound;
pub mod inventory;
pub mod types;

pub use inbound::SpApiInboundClient;
pub use inventory::SpApiInventorySource;

pub const INVENTORY_SUMMARIES_PATH: &str = "/fba/inventory/v1/summaries";
pub const INBOUND_PLANS_PATH: &str = "/inbound/fba/2024-03-20/inboundPlans";
pub const INBOUND_OPERATIONS_PATH: &str = "/inbound/fba/2024-03-20/operations";
