//! Inbound shipment plan types

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Party responsible for preparing or labelling an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Owner {
    #[default]
    None,
    Seller,
}

impl Owner {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Seller => "SELLER",
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which ownership field the remote service rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipDimension {
    Prep,
    Label,
}

/// A per-SKU rejection recovered from the remote error text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnershipViolation {
    pub sku: String,
    pub dimension: OwnershipDimension,
}

/// Learned requirement for one SKU. Absent SKUs default to `NONE`/`NONE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemRequirement {
    pub prep_owner: Owner,
    pub label_owner: Owner,
}

impl ItemRequirement {
    /// Upgrade the violated dimension to `SELLER`. Returns whether anything
    /// changed.
    pub fn require_seller(&mut self, dimension: OwnershipDimension) -> bool {
        let slot = match dimension {
            OwnershipDimension::Prep => &mut self.prep_owner,
            OwnershipDimension::Label => &mut self.label_owner,
        };
        let changed = *slot != Owner::Seller;
        *slot = Owner::Seller;
        changed
    }
}

/// SKU → requirement, ordered so the persisted file is stable.
pub type PrepRequirements = BTreeMap<String, ItemRequirement>;

/// Item as supplied by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItemInput {
    pub sku: String,
    pub quantity: u32,
}

impl PlanItemInput {
    #[must_use]
    pub fn new(sku: impl Into<String>, quantity: u32) -> Self {
        Self { sku: sku.into(), quantity }
    }
}

/// Item annotated with ownership, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItem {
    pub sku: String,
    pub quantity: u32,
    pub prep_owner: Owner,
    pub label_owner: Owner,
}

impl PlanItem {
    #[must_use]
    pub fn annotate(input: &PlanItemInput, requirement: ItemRequirement) -> Self {
        Self {
            sku: input.sku.clone(),
            quantity: input.quantity,
            prep_owner: requirement.prep_owner,
            label_owner: requirement.label_owner,
        }
    }
}

/// Identifiers returned when the remote service accepts a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPlan {
    pub inbound_plan_id: String,
    pub operation_id: String,
}

/// Accepted plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResult {
    pub inbound_plan_id: String,
    pub operation_id: String,
    /// 1 when accepted on first submission, 2 after the corrective retry.
    pub attempts: u8,
    /// Requirements learned from the first rejection, empty if none.
    pub corrected: Vec<OwnershipViolation>,
}

impl PlanResult {
    #[must_use]
    pub fn accepted(created: CreatedPlan, attempts: u8, corrected: Vec<OwnershipViolation>) -> Self {
        Self {
            inbound_plan_id: created.inbound_plan_id,
            operation_id: created.operation_id,
            attempts,
            corrected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationProblem {
    pub code: String,
    pub message: String,
    pub severity: String,
}

/// Status of an asynchronous inbound operation such as plan creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundOperationStatus {
    pub operation_id: String,
    pub operation: String,
    pub operation_status: String,
    pub operation_problems: Vec<OperationProblem>,
}
