//! Application context - dependency injection container
//!
//! The token manager and the rate limiter registry are created exactly once
//! here and shared by every component through `Arc`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sellerdesk_common::auth::TokenLifecycleManager;
use sellerdesk_common::resilience::RateLimiterRegistry;
use sellerdesk_core::{InventoryCacheIndex, PlanRetryEngine};
use sellerdesk_domain::{Config, DatabaseConfig, Result, SellerDeskError};
use sellerdesk_infra::{
    operation_rate_limiters, ApiClientConfig, ApiGatewayClient, ConfigStore, DbManager,
    InfraError, JsonPrepRequirementRepository, LwaConfig, LwaTokenClient, SpApiInboundClient,
    SpApiInventorySource, SqliteInventoryRepository,
};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

/// Overrides `database.encryption_key` when the config leaves it unset.
pub const DATABASE_KEY_ENV: &str = "SELLERDESK_DATABASE_KEY";

/// Token manager backed by Login with Amazon, persisting rotations to the
/// config file.
pub type SpApiTokenManager = TokenLifecycleManager<LwaTokenClient, Arc<ConfigStore>>;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub config_store: Arc<ConfigStore>,
    pub db: Arc<DbManager>,

    // Shared process-wide collaborators
    pub token_manager: Arc<SpApiTokenManager>,
    pub rate_limiters: Arc<RateLimiterRegistry>,
    pub gateway: Arc<ApiGatewayClient>,

    // Services
    pub inbound: Arc<SpApiInboundClient>,
    pub plan_engine: Arc<PlanRetryEngine>,
    pub inventory_cache: Arc<SqliteInventoryRepository>,
    pub inventory_index: Arc<InventoryCacheIndex>,

    shutdown: CancellationToken,
}

impl AppContext {
    /// Load configuration and wire every component.
    ///
    /// `config_path` follows the loader's resolution order when `None`
    /// (`SELLERDESK_CONFIG`, then the standard locations). A `.env` file is
    /// loaded first if present.
    ///
    /// # Errors
    /// Configuration, database and client construction failures, and a
    /// corrupt prep-requirement store.
    pub fn bootstrap(config_path: Option<PathBuf>) -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env"),
            Err(e) => debug!(error = %e, "No .env loaded"),
        }

        let config_store = Arc::new(ConfigStore::load(config_path)?);
        let config = config_store.snapshot();
        info!(config = %config_store.path().display(), "SellerDesk starting");

        let db = Arc::new(DbManager::open(&database_config(&config.database))?);
        let timeout = Duration::from_secs(config.http.timeout_seconds.max(1));

        let lwa = LwaTokenClient::new(LwaConfig::from_auth(&config.auth, timeout))
            .map_err(|e| SellerDeskError::from(InfraError::from(e)))?;
        let token_manager = Arc::new(TokenLifecycleManager::new(
            lwa,
            Arc::clone(&config_store),
            config.auth.refresh_token.clone(),
        ));

        let rate_limiters = Arc::new(
            operation_rate_limiters().map_err(|e| SellerDeskError::from(InfraError::from(e)))?,
        );
        debug!(operations = rate_limiters.len(), "Rate limiters registered");

        let gateway = Arc::new(ApiGatewayClient::new(
            &ApiClientConfig { endpoint: config.auth.api_endpoint.clone(), timeout },
            Arc::clone(&token_manager) as _,
            Arc::clone(&rate_limiters),
        )?);

        if config.ship_from.is_none() {
            warn!("No ship_from address configured; inbound plan creation will fail");
        }
        let inbound = Arc::new(SpApiInboundClient::new(
            Arc::clone(&gateway),
            &config.marketplace,
            config.ship_from.clone(),
        ));
        let requirements =
            Arc::new(JsonPrepRequirementRepository::new(&config.storage.prep_requirements_path));
        let plan_engine = Arc::new(PlanRetryEngine::new(Arc::clone(&inbound) as _, requirements)?);

        let inventory_cache = Arc::new(SqliteInventoryRepository::new(Arc::clone(&db)));
        let source = Arc::new(SpApiInventorySource::new(Arc::clone(&gateway), &config.marketplace));
        let inventory_index =
            Arc::new(InventoryCacheIndex::new(source, Arc::clone(&inventory_cache) as _));

        info!(endpoint = gateway.base_url(), "SellerDesk initialized");
        Ok(Self {
            config,
            config_store,
            db,
            token_manager,
            rate_limiters,
            gateway,
            inbound,
            plan_engine,
            inventory_cache,
            inventory_index,
            shutdown: CancellationToken::new(),
        })
    }

    /// Token for one operation; cancelled by [`shutdown`](Self::shutdown).
    pub fn cancel_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Token for one operation, cancelled by shutdown or by `caller`.
    ///
    /// Hold the guard until the operation returns; dropping it stops the
    /// watcher task.
    pub(crate) fn linked_cancel_token(
        &self,
        caller: &CancellationToken,
    ) -> (CancellationToken, DropGuard) {
        let token = self.shutdown.child_token();
        let watched = token.clone();
        let caller = caller.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = caller.cancelled() => watched.cancel(),
                () = watched.cancelled() => {}
            }
        });
        (token.clone(), token.drop_guard())
    }

    /// Cancel every in-flight and future operation.
    pub fn shutdown(&self) {
        info!("SellerDesk shutting down");
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

fn database_config(configured: &DatabaseConfig) -> DatabaseConfig {
    let mut resolved = configured.clone();
    if resolved.encryption_key.is_none() {
        if let Ok(key) = std::env::var(DATABASE_KEY_ENV) {
            if !key.trim().is_empty() {
                debug!("Using {DATABASE_KEY_ENV} for database encryption");
                resolved.encryption_key = Some(key);
            }
        }
    }
    resolved
}
