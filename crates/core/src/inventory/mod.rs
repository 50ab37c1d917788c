//! Local inventory cache and search

pub mod ports;
pub mod service;

pub use service::InventoryCacheIndex;
