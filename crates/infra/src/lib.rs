//! # SellerDesk Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The authenticated, rate-limited API gateway
//! - Login-with-Amazon token exchange
//! - SQLite inventory cache and JSON requirement store
//! - Configuration loading and refresh-token write-back
//! - Selling Partner API adapters
//!
//! ## Architecture
//! - Implements traits defined in `sellerdesk-core` and `sellerdesk-common`
//! - Contains all "impure" code (network, disk, database)

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod storage;

// Re-export commonly used items
pub use api::{
    operation_rate_limiters, AccessTokenProvider, ApiClientConfig, ApiError, ApiGatewayClient,
    ApiRequest, RemoteCallOutcome,
};
pub use auth::{LwaConfig, LwaTokenClient};
pub use config::ConfigStore;
pub use database::{DbManager, SqliteInventoryRepository};
pub use errors::InfraError;
pub use http::HttpClient;
pub use integrations::sp_api::{SpApiInboundClient, SpApiInventorySource};
pub use storage::JsonPrepRequirementRepository;
