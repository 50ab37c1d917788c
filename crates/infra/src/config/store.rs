//! Durable configuration with refresh-token write-back
//!
//! [`ConfigStore`] owns the loaded [`Config`] and rewrites the whole file
//! whenever the refresh token rotates.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use sellerdesk_common::auth::{RefreshTokenStore, TokenError};
use sellerdesk_domain::{Config, Result, SellerDeskError};
use tracing::{info, warn};

use super::loader::{load_from_file, serialize_config};
use crate::storage::write_atomic;

#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: Mutex<Config>,
}

impl ConfigStore {
    /// Resolve and load the config file.
    ///
    /// # Errors
    /// See [`load_from_file`].
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let resolved = super::loader::resolve_config_path(path)?;
        let config = load_from_file(Some(resolved.clone()))?;
        Ok(Self::new(resolved, config))
    }

    pub fn new(path: PathBuf, config: Config) -> Self {
        Self { path, config: Mutex::new(config) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current configuration.
    pub fn snapshot(&self) -> Config {
        self.config.lock().clone()
    }

    /// Write the current configuration back to its file.
    ///
    /// # Errors
    /// Returns `SellerDeskError::Persistence` if the write fails.
    pub fn save(&self) -> Result<()> {
        let config = self.config.lock();
        self.write(&config)
    }

    fn write(&self, config: &Config) -> Result<()> {
        let rendered = serialize_config(config, &self.path)?;
        write_atomic(&self.path, rendered.as_bytes()).map_err(|e| {
            SellerDeskError::Persistence(format!(
                "failed to write config {}: {e}",
                self.path.display()
            ))
        })
    }
}

impl RefreshTokenStore for ConfigStore {
    fn persist_refresh_token(&self, refresh_token: &str) -> std::result::Result<(), TokenError> {
        let mut config = self.config.lock();
        let previous = std::mem::replace(&mut config.auth.refresh_token, refresh_token.to_string());

        if let Err(err) = self.write(&config) {
            config.auth.refresh_token = previous;
            warn!(path = %self.path.display(), error = %err, "Refresh token not persisted");
            return Err(TokenError::Persist(err.to_string()));
        }

        info!(path = %self.path.display(), "Rotated refresh token persisted");
        Ok(())
    }
}
