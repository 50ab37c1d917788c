//! Gateway to the remote selling-partner API
//!
//! # Architecture
//!
//! - [`ApiGatewayClient`] attaches credentials, waits on the per-operation
//!   rate limiter and sends exactly one request through [`crate::http::HttpClient`]
//! - [`RemoteCallOutcome`] is the single decoded result type for every call
//! - [`AccessTokenProvider`] is the seam to the token lifecycle manager

pub mod auth;
pub mod client;
pub mod errors;
pub mod outcome;
pub mod quotas;

pub use auth::{AccessTokenProvider, StaticTokenProvider};
pub use client::{ApiClientConfig, ApiGatewayClient, ApiRequest};
pub use errors::{ApiError, ApiErrorCategory};
pub use outcome::{DecodedErrorBody, ErrorPayload, ErrorShape, RemoteCallOutcome, RemoteErrorEntry};
pub use quotas::operation_rate_limiters;
