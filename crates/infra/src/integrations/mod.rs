//! External service integrations

pub mod sp_api;
