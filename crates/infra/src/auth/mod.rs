//! Login-with-Amazon token exchange
//!
//! [`LwaTokenClient`] implements the refresh-token grant consumed by
//! `sellerdesk_common::auth::TokenLifecycleManager`.

pub mod lwa;

pub use lwa::{LwaConfig, LwaTokenClient};
