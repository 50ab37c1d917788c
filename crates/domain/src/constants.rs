//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Endpoints
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://api.amazon.com/auth/o2/token";
pub const DEFAULT_API_ENDPOINT: &str = "sellingpartnerapi-na.amazon.com";
pub const DEFAULT_MARKETPLACE_ID: &str = "ATVPDKIKX0DER";
pub const DEFAULT_COUNTRY_CODE: &str = "US";

// Token lifecycle
pub const TOKEN_SAFETY_MARGIN_SECS: i64 = 300;

// Storage
pub const DEFAULT_DATABASE_FILE: &str = "sellerdesk.db";
pub const DEFAULT_PREP_REQUIREMENTS_FILE: &str = "sellerdesk_item_requirements.json";
pub const INVENTORY_INSERT_BATCH_SIZE: usize = 500;

// HTTP
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const ACCESS_TOKEN_HEADER: &str = "x-amz-access-token";
pub const AMZ_DATE_HEADER: &str = "x-amz-date";
pub const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Rate-limiter keys, one per remote operation category.
pub mod operations {
    pub const CATALOG_SEARCH_ITEMS: &str = "catalog.searchItems";
    pub const CATALOG_GET_ITEMS: &str = "catalog.getItems";
    pub const LISTINGS_GET_ITEM: &str = "listings.getItem";
    pub const LISTINGS_PATCH_LISTINGS: &str = "listings.patchListings";
    pub const LISTINGS_DELETE_LISTINGS_ITEM: &str = "listings.deleteListingsItem";
    pub const LISTINGS_CREATE_ITEM: &str = "listings.createItem";
    pub const LISTINGS_SEARCH_PRODUCT_TYPE_DEFINITIONS: &str =
        "listings.searchProductTypeDefinitions";
    pub const LISTINGS_GET_PRODUCT_TYPE_DEFINITIONS: &str = "listings.getProductTypeDefinitions";
    pub const FBA_INVENTORY_SUMMARIES: &str = "fba.inventorySummaries";
    pub const FBA_CREATE_INBOUND_PLAN: &str = "fba.createInboundPlan";
    pub const FBA_GET_INBOUND_OPERATION_STATUS: &str = "fba.getInboundOperationStatus";
    pub const FEEDS_GET_FEEDS: &str = "feeds.getFeeds";
    pub const FEEDS_CREATE_FEED_DOCUMENT: &str = "feeds.createFeedDocument";
    pub const FEEDS_CREATE_FEED: &str = "feeds.createFeed";
    pub const FEEDS_GET_FEED: &str = "feeds.getFeed";
    pub const FEEDS_GET_FEED_DOCUMENT: &str = "feeds.getFeedDocument";
}

/// Quotas published by the remote service: `(key, requests per second, burst)`.
pub const OPERATION_QUOTAS: &[(&str, f64, u32)] = &[
    (operations::CATALOG_SEARCH_ITEMS, 2.0, 2),
    (operations::CATALOG_GET_ITEMS, 2.0, 2),
    (operations::LISTINGS_GET_ITEM, 5.0, 10),
    (operations::LISTINGS_PATCH_LISTINGS, 5.0, 5),
    (operations::LISTINGS_DELETE_LISTINGS_ITEM, 5.0, 10),
    (operations::LISTINGS_CREATE_ITEM, 5.0, 10),
    (operations::LISTINGS_SEARCH_PRODUCT_TYPE_DEFINITIONS, 5.0, 10),
    (operations::LISTINGS_GET_PRODUCT_TYPE_DEFINITIONS, 5.0, 10),
    (operations::FBA_INVENTORY_SUMMARIES, 2.0, 2),
    (operations::FBA_CREATE_INBOUND_PLAN, 2.0, 2),
    (operations::FBA_GET_INBOUND_OPERATION_STATUS, 2.0, 6),
    (operations::FEEDS_GET_FEEDS, 0.0222, 10),
    (operations::FEEDS_CREATE_FEED_DOCUMENT, 0.5, 15),
    (operations::FEEDS_CREATE_FEED, 0.0083, 15),
    (operations::FEEDS_GET_FEED, 2.0, 15),
    (operations::FEEDS_GET_FEED_DOCUMENT, 0.0222, 10),
];
