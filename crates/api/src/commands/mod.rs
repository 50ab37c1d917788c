//! Operations exposed by [`AppContext`](crate::AppContext)
//!
//! Each module adds an `impl AppContext` block. Every operation is logged
//! through [`execute_with_logging`](crate::utils::command_helpers::execute_with_logging)
//! and runs under a child of the context's shutdown token.

pub mod auth;
pub mod gateway;
pub mod health;
pub mod inventory;
pub mod shipment;

pub use auth::TokenStatus;
