//! # SellerDesk Domain
//!
//! Business domain types and models for SellerDesk.
//!
//! This crate contains:
//! - Domain error taxonomy and Result definition
//! - Configuration structures
//! - Inventory and inbound shipment types
//! - Operation keys and their published quotas
//!
//! ## Architecture
//! - No dependencies on other SellerDesk crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
