//! Shared HTTP transport

pub mod client;

pub use client::{user_agent, HttpClient, HttpClientBuilder, RetryPolicy};
