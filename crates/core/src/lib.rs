//! # SellerDesk Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for remote calls and local persistence
//! - The inbound plan retry engine and its error-text matcher
//! - The inventory cache build/query service
//!
//! ## Architecture Principles
//! - Only depends on `sellerdesk-domain`
//! - No database, HTTP, or filesystem code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod inventory;
pub mod shipment;

// Re-export specific items to avoid ambiguity
pub use inventory::ports::{InventoryCache, InventorySource};
pub use inventory::InventoryCacheIndex;
pub use shipment::ports::{PlanSubmitter, PrepRequirementRepository};
pub use shipment::violations::extract_ownership_violations;
pub use shipment::PlanRetryEngine;
