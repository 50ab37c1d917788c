//! Domain types and models

pub mod inventory;
pub mod shipment;

pub use inventory::{
    BuildReport, InventoryPage, InventoryQuery, InventoryRecord, SortColumn, SortDirection, SortKey,
};
pub use shipment::{
    CreatedPlan, InboundOperationStatus, ItemRequirement, OperationProblem, OwnershipDimension,
    OwnershipViolation, Owner, PlanItem, PlanItemInput, PlanResult, PrepRequirements,
};
