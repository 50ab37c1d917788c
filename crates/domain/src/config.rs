//! Configuration management
//!
//! The whole [`Config`] is rewritten to disk whenever the remote service
//! rotates the refresh token, so every field must survive a
//! serialize/deserialize cycle unchanged.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_ENDPOINT, DEFAULT_COUNTRY_CODE, DEFAULT_DATABASE_FILE, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_MARKETPLACE_ID, DEFAULT_PREP_REQUIREMENTS_FILE, DEFAULT_TOKEN_ENDPOINT,
};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub marketplace: MarketplaceConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_from: Option<ShipFromAddress>,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// OAuth client credentials and endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    /// Host (or full base URL) of the Selling Partner API.
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,
}

/// Marketplaces the merchant sells in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceConfig {
    pub marketplace_ids: Vec<String>,
}

impl MarketplaceConfig {
    /// First configured marketplace, used as inventory granularity.
    #[must_use]
    pub fn primary(&self) -> &str {
        self.marketplace_ids.first().map_or(DEFAULT_MARKETPLACE_ID, String::as_str)
    }
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self { marketplace_ids: vec![DEFAULT_MARKETPLACE_ID.to_string()] }
    }
}

/// Source address for inbound shipment plans
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShipFromAddress {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_or_province_code: Option<String>,
    pub postal_code: String,
    #[serde(default = "default_country_code")]
    pub country_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone_number: String,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_key: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DATABASE_FILE.to_string(), pool_size: 4, encryption_key: None }
    }
}

/// Local file locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub prep_requirements_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            prep_requirements_path: std::env::temp_dir().join(DEFAULT_PREP_REQUIREMENTS_FILE),
        }
    }
}

/// Outbound HTTP settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECS }
    }
}

fn default_token_endpoint() -> String {
    DEFAULT_TOKEN_ENDPOINT.to_string()
}

fn default_api_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_country_code() -> String {
    DEFAULT_COUNTRY_CODE.to_string()
}
