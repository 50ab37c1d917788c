//! OAuth 2.0 refresh-token lifecycle
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────┐
//! │ TokenLifecycleManager  │  cache + single-flight refresh
//! └───────────┬────────────┘
//!             │
//!             ├──► TokenExchangeClient  (HTTP refresh-token grant)
//!             └──► RefreshTokenStore    (durable config write-back)
//! ```
//!
//! Both ports are implemented in `sellerdesk-infra`; tests here use in-memory
//! fakes.
//!
//! # Module Organization
//!
//! - **[`types`]**: `Credential` and the token endpoint response
//! - **[`traits`]**: ports for the exchange and refresh-token persistence
//! - **[`token_manager`]**: the manager itself

pub mod token_manager;
pub mod traits;
pub mod types;

pub use token_manager::{TokenError, TokenLifecycleManager, DEFAULT_SAFETY_MARGIN_SECS};
pub use traits::{RefreshTokenStore, TokenExchangeClient};
pub use types::{Credential, TokenResponse};
