//! Inbound shipment plan creation with ownership-requirement learning

pub mod ports;
pub mod service;
pub mod violations;

pub use service::PlanRetryEngine;
