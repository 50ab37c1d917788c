//! # SellerDesk API
//!
//! Application layer: the composition root and the operations it exposes.
//!
//! This crate contains:
//! - [`AppContext`], which wires config, database, token manager, rate
//!   limiters, gateway and services together
//! - The operations a front end calls (`ensure_token`, `call_rate_limited`,
//!   `submit_plan_with_retry`, `rebuild_inventory_cache`, `query_inventory`)
//! - Logging initialisation
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Owns no business logic

pub mod commands;
pub mod context;
pub mod utils;

pub use commands::TokenStatus;
pub use context::{AppContext, SpApiTokenManager};
pub use utils::logging::{init as init_logging, LoggingConfig};
